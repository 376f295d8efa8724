// src/handlers/analysis.rs
use log::{error, info, warn};
use serde::Deserialize;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::SharedAnalyzer;
use crate::errors::ErrorClass;
use crate::models::AnalysisYears;

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub years: String,
}

/// Boundary checks that run before the analyzer sees the request.
fn parse_request(country_code: &str, query: &AnalysisQuery) -> Result<u32, ApiError> {
    if country_code.chars().count() != 2 {
        return Err(ApiError::bad_request(
            "Country code must be exactly 2 characters",
        ));
    }

    let years: u32 = query.years.trim().parse().map_err(|_| {
        ApiError::bad_request(format!(
            "Years must be one of {:?}, got {:?}",
            AnalysisYears::ALLOWED,
            query.years
        ))
    })?;

    AnalysisYears::try_from(years).map_err(ApiError::from)?;
    Ok(years)
}

pub async fn get_analysis(
    country_code: String,
    query: AnalysisQuery,
    analyzer: SharedAnalyzer,
) -> Result<Json, Rejection> {
    info!("Handling analysis request for {} ({:?})", country_code, query.years);

    let years = parse_request(&country_code, &query).map_err(|e| {
        warn!("Rejected analysis request: {}", e);
        warp::reject::custom(e)
    })?;

    match analyzer.analyze(&country_code, years) {
        Ok(result) => Ok(warp::reply::json(&result)),
        Err(e) => {
            if e.class() == ErrorClass::Internal {
                error!("Analysis failed for {}: {}", country_code, e);
            } else {
                warn!("Analysis for {} not served: {}", country_code, e);
            }
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}
