// src/handlers/mod.rs
pub mod analysis;
pub mod countries;
pub mod error;
pub mod health;

use std::sync::Arc;

use crate::services::store::RecordStore;
use crate::services::PortfolioAnalyzer;

/// Analyzer shared by every request; the store behind it is read-only.
pub type SharedAnalyzer = Arc<PortfolioAnalyzer<dyn RecordStore>>;
