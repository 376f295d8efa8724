// src/services/calculator.rs
use crate::errors::{AnalysisError, Result};

/// CAGR, cumulative compounding and inflation-adjusted CAGR. Stateless; all
/// rates are decimals (0.0845 = 8.45%).
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthCalculator;

impl GrowthCalculator {
    pub fn new() -> Self {
        GrowthCalculator
    }

    /// `(end / start)^(1 / years) - 1`. An end value of zero is a total loss and
    /// returns exactly `-1.0`.
    pub fn compute_cagr(&self, start_value: f64, end_value: f64, years: f64) -> Result<f64> {
        if start_value.is_nan() || start_value <= 0.0 {
            return Err(AnalysisError::InvalidArgument(
                "Start value must be greater than zero".to_string(),
            ));
        }
        if end_value.is_nan() || end_value < 0.0 {
            return Err(AnalysisError::InvalidArgument(
                "End value cannot be negative".to_string(),
            ));
        }
        if years.is_nan() || years <= 0.0 {
            return Err(AnalysisError::InvalidArgument(
                "Years must be greater than zero".to_string(),
            ));
        }

        if end_value == 0.0 {
            return Ok(-1.0);
        }

        Ok((end_value / start_value).powf(1.0 / years) - 1.0)
    }

    /// Product of `(1 + rate)` over every rate, minus one.
    pub fn compute_cumulative_compounding(&self, monthly_rates: &[f64]) -> Result<f64> {
        if monthly_rates.is_empty() {
            return Err(AnalysisError::InvalidArgument(
                "Monthly rates list cannot be empty".to_string(),
            ));
        }

        let growth: f64 = monthly_rates.iter().map(|rate| 1.0 + rate).product();
        Ok(growth - 1.0)
    }

    /// `(1 + nominal) / (1 + inflation) - 1`. Inflation at or below -100% leaves
    /// nothing to divide by.
    pub fn compute_real_cagr(&self, nominal_cagr: f64, cumulative_inflation: f64) -> Result<f64> {
        if cumulative_inflation.is_nan() || cumulative_inflation <= -1.0 {
            return Err(AnalysisError::InvalidArgument(
                "Cumulative inflation must be greater than -1".to_string(),
            ));
        }

        Ok((1.0 + nominal_cagr) / (1.0 + cumulative_inflation) - 1.0)
    }
}

/// `0.0845` with two decimals becomes `"8.45%"`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}
