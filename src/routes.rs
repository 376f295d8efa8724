// src/routes.rs
use log::{error, info};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::analysis::{get_analysis, AnalysisQuery};
use crate::handlers::countries::get_countries;
use crate::handlers::error::ApiError;
use crate::handlers::health::get_health;
use crate::handlers::SharedAnalyzer;

// Turn rejections into a JSON `{"error": ...}` body with a matching status.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(query_error) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid query: {}", query_error);
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    analyzer: SharedAnalyzer,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let analyzer_filter = warp::any().map(move || analyzer.clone());

    let health_route = warp::path!("health")
        .and(warp::get())
        .and_then(get_health);

    let analysis_route = warp::path!("analysis" / String)
        .and(warp::get())
        .and(warp::query::<AnalysisQuery>())
        .and(analyzer_filter.clone())
        .and_then(get_analysis);

    let countries_route = warp::path!("countries")
        .and(warp::get())
        .and(analyzer_filter.clone())
        .and_then(get_countries);

    info!("All routes configured successfully.");

    health_route
        .or(analysis_route)
        .or(countries_route)
        .recover(handle_rejection)
}
