// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AnalysisError;

/// One tenant's rent for one building in one month. Column order matches
/// `rentals.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub building_id: String,
    pub tenant_id: String,
    pub country_code: String,
    pub month: u32,
    pub year: i32,
    pub rental_amount: f64,
    pub currency: String,
}

/// Monthly inflation rate for a country, e.g. 0.002 = 0.2%. Column order matches
/// `inflation.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationRecord {
    pub country_code: String,
    pub year: i32,
    pub month: u32,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub building_id: String,
    pub country_code: String,
    pub name: String,
    pub property_type: String,
    pub city: String,
}

/// Years a stored observation may fall in.
pub const MIN_RECORD_YEAR: i32 = 2000;
pub const MAX_RECORD_YEAR: i32 = 2100;

/// Row-level data model rules, checked when a table is loaded.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

fn check_code(field: &str, value: &str, len: usize) -> Result<(), String> {
    let value = value.trim();
    if value.len() != len || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("{} must be {} letters, got {:?}", field, len, value));
    }
    Ok(())
}

fn check_period(year: i32, month: u32) -> Result<(), String> {
    if !(1..=12).contains(&month) {
        return Err(format!("month must be 1-12, got {}", month));
    }
    if !(MIN_RECORD_YEAR..=MAX_RECORD_YEAR).contains(&year) {
        return Err(format!(
            "year must be {}-{}, got {}",
            MIN_RECORD_YEAR, MAX_RECORD_YEAR, year
        ));
    }
    Ok(())
}

impl Validate for RentalRecord {
    fn validate(&self) -> Result<(), String> {
        check_code("country_code", &self.country_code, 2)?;
        check_code("currency", &self.currency, 3)?;
        check_period(self.year, self.month)?;
        if !self.rental_amount.is_finite() || self.rental_amount < 0.0 {
            return Err(format!(
                "rental_amount must be a non-negative number, got {}",
                self.rental_amount
            ));
        }
        Ok(())
    }
}

impl Validate for InflationRecord {
    fn validate(&self) -> Result<(), String> {
        check_code("country_code", &self.country_code, 2)?;
        check_period(self.year, self.month)?;
        if !self.inflation_rate.is_finite() {
            return Err(format!("inflation_rate must be finite, got {}", self.inflation_rate));
        }
        Ok(())
    }
}

impl Validate for BuildingRecord {
    fn validate(&self) -> Result<(), String> {
        if self.building_id.trim().is_empty() {
            return Err("building_id cannot be empty".to_string());
        }
        check_code("country_code", &self.country_code, 2)
    }
}

/// Trailing window lengths an analysis may be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum AnalysisYears {
    One,
    Three,
    Five,
    Ten,
}

impl AnalysisYears {
    pub const ALLOWED: [u32; 4] = [1, 3, 5, 10];

    pub fn get(self) -> u32 {
        match self {
            AnalysisYears::One => 1,
            AnalysisYears::Three => 3,
            AnalysisYears::Five => 5,
            AnalysisYears::Ten => 10,
        }
    }
}

impl TryFrom<u32> for AnalysisYears {
    type Error = AnalysisError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AnalysisYears::One),
            3 => Ok(AnalysisYears::Three),
            5 => Ok(AnalysisYears::Five),
            10 => Ok(AnalysisYears::Ten),
            other => Err(AnalysisError::InvalidRequest(format!(
                "Years must be one of [1, 3, 5, 10], got {}",
                other
            ))),
        }
    }
}

impl From<AnalysisYears> for u32 {
    fn from(years: AnalysisYears) -> Self {
        years.get()
    }
}

impl fmt::Display for AnalysisYears {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Calendar span a request resolves to: January 1 of the first year through
/// December 31 of the latest year with rental data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub country_code: String,
    pub years: AnalysisYears,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl From<&AnalysisWindow> for DateRange {
    fn from(window: &AnalysisWindow) -> Self {
        DateRange {
            start_date: window.start.format("%Y-%m").to_string(),
            end_date: window.end.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalIncome {
    pub start_period_total: f64,
    pub end_period_total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthMetrics {
    pub nominal_cagr_percent: f64,
    pub cumulative_inflation_percent: f64,
    pub real_cagr_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub buildings_analyzed: usize,
    pub total_months: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    pub country_code: String,
    pub analysis_period_years: AnalysisYears,
    pub date_range: DateRange,
    pub rental_income: RentalIncome,
    pub growth_metrics: GrowthMetrics,
    pub portfolio_summary: PortfolioSummary,
}
