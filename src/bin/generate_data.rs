// src/bin/generate_data.rs
use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use rental_growth::services::generator::{
    generate_dataset, write_dataset, GeneratorConfig, COUNTRIES,
};

const DEFAULT_SEED: u64 = 42;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    // Usage: generate_data [output_dir] [seed]
    let mut args = env::args().skip(1);
    let output_dir = args
        .next()
        .or_else(|| env::var("DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let seed = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Seed must be a number, got {:?}", raw))?,
        None => DEFAULT_SEED,
    };

    let config = GeneratorConfig::default();
    println!("Generating test data...");
    println!("  - Countries: {}", COUNTRIES.len());
    println!("  - Buildings per country: {}", config.buildings_per_country);
    println!("  - Time period: {}-{}", config.start_year, config.end_year);
    println!("  - Tenants per building: {}-{}", config.min_tenants, config.max_tenants);
    println!("  - Seed: {}", seed);

    let dataset = generate_dataset(&config, seed);
    write_dataset(&output_dir, &dataset)?;

    println!("Test data written to {}", output_dir.display());
    println!("  - Buildings: {}", dataset.buildings.len());
    println!("  - Rental records: {}", dataset.rentals.len());
    println!("  - Inflation records: {}", dataset.inflation.len());
    Ok(())
}
