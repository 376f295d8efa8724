// src/handlers/countries.rs
use log::{error, info};
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::SharedAnalyzer;

pub async fn get_countries(analyzer: SharedAnalyzer) -> Result<Json, Rejection> {
    info!("Handling request to list countries");

    let countries = analyzer.store().available_countries().map_err(|e| {
        error!("Failed to list countries: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    Ok(warp::reply::json(&json!({ "countries": countries })))
}
