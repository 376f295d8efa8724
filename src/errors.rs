// src/errors.rs
use thiserror::Error;

/// Failure kinds produced by the record store, the growth calculator and the
/// portfolio analyzer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Malformed or out-of-range request input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Country or boundary month absent from the backing data.
    #[error("{0}")]
    NoDataFound(String),

    /// Country is known but its history is shorter than the requested window.
    #[error("{0}")]
    InsufficientData(String),

    /// Backing data medium missing or unreadable.
    #[error("{0}")]
    SourceUnavailable(String),

    /// A calculator precondition was violated.
    #[error("{0}")]
    InvalidArgument(String),
}

/// How a failure is presented to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Internal,
}

impl AnalysisError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AnalysisError::InvalidRequest(_) => ErrorClass::BadRequest,
            AnalysisError::NoDataFound(_) | AnalysisError::InsufficientData(_) => {
                ErrorClass::NotFound
            }
            AnalysisError::SourceUnavailable(_) | AnalysisError::InvalidArgument(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Short kind name, safe to show to users for internal-class failures.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidRequest(_) => "Invalid request",
            AnalysisError::NoDataFound(_) => "No data found",
            AnalysisError::InsufficientData(_) => "Insufficient data",
            AnalysisError::SourceUnavailable(_) => "Data source unavailable",
            AnalysisError::InvalidArgument(_) => "Invalid calculation argument",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
