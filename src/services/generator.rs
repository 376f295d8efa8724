// src/services/generator.rs
use anyhow::{Context, Result};
use csv::Writer;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::models::{BuildingRecord, InflationRecord, RentalRecord};
use crate::services::store::{BUILDINGS_FILE, INFLATION_FILE, RENTALS_FILE};

pub struct CountryProfile {
    pub code: &'static str,
    pub currency: &'static str,
    pub avg_rent: f64,
    pub avg_inflation: f64,
    pub cities: [&'static str; 5],
}

pub const COUNTRIES: [CountryProfile; 5] = [
    CountryProfile {
        code: "US",
        currency: "USD",
        avg_rent: 5000.0,
        avg_inflation: 0.0020,
        cities: ["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"],
    },
    CountryProfile {
        code: "GB",
        currency: "GBP",
        avg_rent: 4000.0,
        avg_inflation: 0.0018,
        cities: ["London", "Manchester", "Birmingham", "Leeds", "Glasgow"],
    },
    CountryProfile {
        code: "DE",
        currency: "EUR",
        avg_rent: 3500.0,
        avg_inflation: 0.0015,
        cities: ["Berlin", "Munich", "Hamburg", "Frankfurt", "Cologne"],
    },
    CountryProfile {
        code: "FR",
        currency: "EUR",
        avg_rent: 3800.0,
        avg_inflation: 0.0016,
        cities: ["Paris", "Lyon", "Marseille", "Toulouse", "Nice"],
    },
    CountryProfile {
        code: "JP",
        currency: "JPY",
        avg_rent: 500000.0,
        avg_inflation: 0.0005,
        cities: ["Tokyo", "Osaka", "Yokohama", "Nagoya", "Sapporo"],
    },
];

const PROPERTY_TYPES: [&str; 4] = ["Office", "Retail", "Industrial", "Mixed Use"];
const BUILDING_SUFFIXES: [&str; 4] = ["Tower", "Plaza", "Center", "Building"];

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub buildings_per_country: usize,
    pub start_year: i32,
    pub end_year: i32,
    pub min_tenants: usize,
    pub max_tenants: usize,
    /// Yearly rent growth applied linearly, 0.02 = 2%.
    pub annual_growth: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            buildings_per_country: 10,
            start_year: 2015,
            end_year: 2024,
            min_tenants: 3,
            max_tenants: 5,
            annual_growth: 0.02,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub buildings: Vec<BuildingRecord>,
    pub rentals: Vec<RentalRecord>,
    pub inflation: Vec<InflationRecord>,
}

/// Synthetic portfolio data. The same seed always produces the same dataset.
pub fn generate_dataset(config: &GeneratorConfig, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dataset = Dataset::default();
    let mut building_counter = 1;
    let mut tenant_counter = 1;

    for profile in &COUNTRIES {
        for i in 0..config.buildings_per_country {
            let building_id = format!("B{:03}", building_counter);
            building_counter += 1;

            let name_city = profile.cities.choose(&mut rng).copied().unwrap_or("Central");
            let suffix = BUILDING_SUFFIXES.choose(&mut rng).copied().unwrap_or("Building");
            let building = BuildingRecord {
                building_id: building_id.clone(),
                country_code: profile.code.to_string(),
                name: format!("{} {} {}", name_city, suffix, i + 1),
                property_type: PROPERTY_TYPES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("Office")
                    .to_string(),
                city: profile.cities.choose(&mut rng).copied().unwrap_or("Central").to_string(),
            };

            let max_tenants = config.max_tenants.max(config.min_tenants);
            let tenants = rng.gen_range(config.min_tenants..=max_tenants);
            for _ in 0..tenants {
                let tenant_id = format!("T{:04}", tenant_counter);
                tenant_counter += 1;
                let spread: f64 = rng.gen_range(0.7..1.3);
                let base_rent = profile.avg_rent * spread;

                for year in config.start_year..=config.end_year {
                    for month in 1..=12u32 {
                        let elapsed = (year - config.start_year) as f64 + (month - 1) as f64 / 12.0;
                        let growth = 1.0 + config.annual_growth * elapsed;
                        let noise: f64 = rng.gen_range(0.98..1.02);
                        let amount = base_rent * growth * noise;
                        dataset.rentals.push(RentalRecord {
                            building_id: building_id.clone(),
                            tenant_id: tenant_id.clone(),
                            country_code: profile.code.to_string(),
                            month,
                            year,
                            rental_amount: round_to(amount, 2),
                            currency: profile.currency.to_string(),
                        });
                    }
                }
            }

            dataset.buildings.push(building);
        }
    }

    for profile in &COUNTRIES {
        for year in config.start_year..=config.end_year {
            for month in 1..=12u32 {
                let variation: f64 = rng.gen_range(0.7..1.3);
                let seasonal = 1.0 + 0.2 * (month as f64 - 6.5) / 6.5;
                dataset.inflation.push(InflationRecord {
                    country_code: profile.code.to_string(),
                    year,
                    month,
                    inflation_rate: round_to(profile.avg_inflation * variation * seasonal, 6),
                });
            }
        }
    }

    dataset
}

/// Writes `buildings.csv`, `rentals.csv` and `inflation.csv` into `dir`,
/// creating it if needed.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    write_csv(&dir.join(BUILDINGS_FILE), &dataset.buildings)?;
    write_csv(&dir.join(RENTALS_FILE), &dataset.rentals)?;
    write_csv(&dir.join(INFLATION_FILE), &dataset.inflation)?;
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("Failed to open {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Generated {}: {} records", path.display(), rows.len());
    Ok(())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
