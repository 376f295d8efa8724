// src/lib.rs

// Re-export or define the top-level modules you need
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod handlers;
pub mod routes;

pub use errors::{AnalysisError, ErrorClass};
