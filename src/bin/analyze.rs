// src/bin/analyze.rs
use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use rental_growth::config::AppConfig;
use rental_growth::services::calculator::format_percentage;
use rental_growth::services::{CsvRecordStore, GrowthCalculator, PortfolioAnalyzer};

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    // Usage: analyze <country_code> <years>
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 2 {
        bail!("usage: analyze <country_code> <years>");
    }
    let years: u32 = args[1]
        .parse()
        .with_context(|| format!("Years must be a number, got {:?}", args[1]))?;

    let config = AppConfig::from_env()?;
    let store = Arc::new(CsvRecordStore::open(&config.data_dir)?);
    let analyzer = PortfolioAnalyzer::new(store, GrowthCalculator::new());
    let result = analyzer.analyze(&args[0], years)?;

    let metrics = &result.growth_metrics;
    println!(
        "{} rental income, {} to {} ({} year(s))",
        result.country_code,
        result.date_range.start_date,
        result.date_range.end_date,
        result.analysis_period_years
    );
    println!(
        "  Start period total: {:.2} {}",
        result.rental_income.start_period_total, result.rental_income.currency
    );
    println!(
        "  End period total:   {:.2} {}",
        result.rental_income.end_period_total, result.rental_income.currency
    );
    println!(
        "  Nominal CAGR:         {}",
        format_percentage(metrics.nominal_cagr_percent / 100.0, 2)
    );
    println!(
        "  Cumulative inflation: {}",
        format_percentage(metrics.cumulative_inflation_percent / 100.0, 2)
    );
    println!("  Real CAGR:            {}", format_percentage(metrics.real_cagr_percent / 100.0, 2));
    println!(
        "  Buildings: {}, months covered: {}",
        result.portfolio_summary.buildings_analyzed, result.portfolio_summary.total_months
    );
    Ok(())
}
