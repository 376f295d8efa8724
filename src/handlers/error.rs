// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::errors::{AnalysisError, ErrorClass};

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err.class() {
            ErrorClass::BadRequest => ApiError::new(StatusCode::BAD_REQUEST, err.to_string()),
            ErrorClass::NotFound => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            // Internal details stay in the log.
            ErrorClass::Internal => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.kind()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_classes_to_status() {
        let err = ApiError::from(AnalysisError::InvalidRequest("bad".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "bad");

        let err = ApiError::from(AnalysisError::InsufficientData("short".into()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = ApiError::from(AnalysisError::SourceUnavailable("/secret/path missing".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Data source unavailable");
    }
}
