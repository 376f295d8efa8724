// src/services/mod.rs
pub mod analyzer;
pub mod calculator;
pub mod generator;
pub mod store;

pub use analyzer::PortfolioAnalyzer;
pub use calculator::GrowthCalculator;
pub use store::{CsvRecordStore, RecordFilter, RecordStore};
