// src/handlers/health.rs
use serde_json::json;
use std::convert::Infallible;
use warp::reply::Json;

pub async fn get_health() -> Result<Json, Infallible> {
    Ok(warp::reply::json(&json!({ "status": "healthy" })))
}
