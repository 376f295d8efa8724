// src/services/store.rs
use csv::Reader;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{AnalysisError, Result};
use crate::models::{BuildingRecord, InflationRecord, RentalRecord, Validate};

pub const BUILDINGS_FILE: &str = "buildings.csv";
pub const RENTALS_FILE: &str = "rentals.csv";
pub const INFLATION_FILE: &str = "inflation.csv";

/// Country and inclusive year bounds, each optional. Country matching is
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    country: Option<String>,
    start_year: Option<i32>,
    end_year: Option<i32>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country_code: &str) -> Self {
        self.country = Some(normalize_country(country_code));
        self
    }

    pub fn start_year(mut self, year: i32) -> Self {
        self.start_year = Some(year);
        self
    }

    pub fn end_year(mut self, year: i32) -> Self {
        self.end_year = Some(year);
        self
    }

    pub fn years(self, start_year: i32, end_year: i32) -> Self {
        self.start_year(start_year).end_year(end_year)
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country.as_deref()
    }

    fn matches_year(&self, year: i32) -> bool {
        self.start_year.map_or(true, |start| year >= start)
            && self.end_year.map_or(true, |end| year <= end)
    }
}

/// Read-only access to buildings, monthly rentals and monthly inflation.
///
/// A filter that matches nothing yields an empty vector. `SourceUnavailable`
/// is reserved for a missing or unreadable backing table.
pub trait RecordStore: Send + Sync {
    fn fetch_rentals(&self, filter: &RecordFilter) -> Result<Vec<RentalRecord>>;

    fn fetch_inflation(&self, filter: &RecordFilter) -> Result<Vec<InflationRecord>>;

    fn fetch_buildings(&self, country_code: Option<&str>) -> Result<Vec<BuildingRecord>>;

    /// `(min_year, max_year)` over the rental rows, optionally for one country.
    fn available_year_range(&self, country_code: Option<&str>) -> Result<(i32, i32)>;

    /// Sorted distinct country codes present in the building table.
    fn available_countries(&self) -> Result<Vec<String>>;
}

pub fn normalize_country(country_code: &str) -> String {
    country_code.trim().to_ascii_uppercase()
}

/// Rows of one table grouped by country, each group kept sorted.
#[derive(Debug, Clone)]
struct CountryIndex<T> {
    by_country: BTreeMap<String, Vec<T>>,
}

impl<T: Clone> CountryIndex<T> {
    fn build<K, F>(rows: Vec<T>, country_of: F, sort_key: K) -> Self
    where
        F: Fn(&T) -> &str,
        K: Fn(&T, &T) -> std::cmp::Ordering,
    {
        let mut by_country: BTreeMap<String, Vec<T>> = BTreeMap::new();
        for row in rows {
            by_country
                .entry(country_of(&row).to_string())
                .or_default()
                .push(row);
        }
        for rows in by_country.values_mut() {
            rows.sort_by(&sort_key);
        }
        CountryIndex { by_country }
    }

    fn select<P>(&self, country: Option<&str>, keep: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        match country {
            Some(code) => self
                .by_country
                .get(code)
                .map(|rows| rows.iter().filter(|r| keep(*r)).cloned().collect())
                .unwrap_or_default(),
            None => self
                .by_country
                .values()
                .flatten()
                .filter(|r| keep(*r))
                .cloned()
                .collect(),
        }
    }
}

/// CSV-backed store. Tables are read once at construction and indexed by
/// country; the store is immutable afterwards and can be shared across threads.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    source: String,
    // `None` when the table's backing file was absent.
    buildings: Option<CountryIndex<BuildingRecord>>,
    rentals: Option<CountryIndex<RentalRecord>>,
    inflation: Option<CountryIndex<InflationRecord>>,
}

impl CsvRecordStore {
    /// Loads the three tables from `data_dir`. A missing directory is an error;
    /// a missing file only disables the queries against that table.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        if !data_dir.is_dir() {
            return Err(AnalysisError::SourceUnavailable(format!(
                "Data directory does not exist: {}",
                data_dir.display()
            )));
        }

        let buildings = read_table::<BuildingRecord>(&data_dir.join(BUILDINGS_FILE))?;
        let rentals = read_table::<RentalRecord>(&data_dir.join(RENTALS_FILE))?;
        let inflation = read_table::<InflationRecord>(&data_dir.join(INFLATION_FILE))?;

        Ok(Self::index(
            data_dir.display().to_string(),
            buildings,
            rentals,
            inflation,
        ))
    }

    pub fn from_records(
        buildings: Vec<BuildingRecord>,
        rentals: Vec<RentalRecord>,
        inflation: Vec<InflationRecord>,
    ) -> Self {
        Self::index(
            "in-memory".to_string(),
            Some(buildings),
            Some(rentals),
            Some(inflation),
        )
    }

    fn index(
        source: String,
        buildings: Option<Vec<BuildingRecord>>,
        rentals: Option<Vec<RentalRecord>>,
        inflation: Option<Vec<InflationRecord>>,
    ) -> Self {
        let buildings = buildings.map(|rows| {
            let rows: Vec<BuildingRecord> = rows
                .into_iter()
                .map(|mut b| {
                    b.country_code = normalize_country(&b.country_code);
                    b
                })
                .collect();
            CountryIndex::build(rows, |b: &BuildingRecord| b.country_code.as_str(), |a, b| {
                a.building_id.cmp(&b.building_id)
            })
        });

        let rentals = rentals.map(|rows| {
            let rows: Vec<RentalRecord> = rows
                .into_iter()
                .map(|mut r| {
                    r.country_code = normalize_country(&r.country_code);
                    r.currency = r.currency.trim().to_ascii_uppercase();
                    r
                })
                .collect();
            CountryIndex::build(rows, |r: &RentalRecord| r.country_code.as_str(), |a, b| {
                (a.year, a.month, &a.building_id, &a.tenant_id)
                    .cmp(&(b.year, b.month, &b.building_id, &b.tenant_id))
            })
        });

        let inflation = inflation.map(|rows| {
            let rows: Vec<InflationRecord> = rows
                .into_iter()
                .map(|mut i| {
                    i.country_code = normalize_country(&i.country_code);
                    i
                })
                .collect();
            CountryIndex::build(rows, |i: &InflationRecord| i.country_code.as_str(), |a, b| {
                (a.year, a.month).cmp(&(b.year, b.month))
            })
        });

        CsvRecordStore {
            source,
            buildings,
            rentals,
            inflation,
        }
    }

    fn table<'a, T>(
        &self,
        table: &'a Option<CountryIndex<T>>,
        file: &str,
    ) -> Result<&'a CountryIndex<T>> {
        table.as_ref().ok_or_else(|| {
            AnalysisError::SourceUnavailable(format!("{} not found in {}", file, self.source))
        })
    }
}

impl RecordStore for CsvRecordStore {
    fn fetch_rentals(&self, filter: &RecordFilter) -> Result<Vec<RentalRecord>> {
        let table = self.table(&self.rentals, RENTALS_FILE)?;
        let rows = table.select(filter.country_code(), |r| filter.matches_year(r.year));
        debug!("Fetched {} rental rows for {:?}", rows.len(), filter);
        Ok(rows)
    }

    fn fetch_inflation(&self, filter: &RecordFilter) -> Result<Vec<InflationRecord>> {
        let table = self.table(&self.inflation, INFLATION_FILE)?;
        let rows = table.select(filter.country_code(), |i| filter.matches_year(i.year));
        debug!("Fetched {} inflation rows for {:?}", rows.len(), filter);
        Ok(rows)
    }

    fn fetch_buildings(&self, country_code: Option<&str>) -> Result<Vec<BuildingRecord>> {
        let table = self.table(&self.buildings, BUILDINGS_FILE)?;
        let country = country_code.map(normalize_country);
        Ok(table.select(country.as_deref(), |_| true))
    }

    fn available_year_range(&self, country_code: Option<&str>) -> Result<(i32, i32)> {
        let table = self.table(&self.rentals, RENTALS_FILE)?;
        let country = country_code.map(normalize_country);

        let years: Vec<i32> = match country.as_deref() {
            Some(code) => table
                .by_country
                .get(code)
                .map(|rows| rows.iter().map(|r| r.year).collect())
                .unwrap_or_default(),
            None => table.by_country.values().flatten().map(|r| r.year).collect(),
        };

        match (years.iter().min(), years.iter().max(), country) {
            (Some(&min), Some(&max), _) => Ok((min, max)),
            (_, _, Some(code)) => Err(AnalysisError::NoDataFound(format!(
                "No rental data for country {}",
                code
            ))),
            // A present but empty table cannot answer for any country.
            (_, _, None) => Err(AnalysisError::SourceUnavailable(format!(
                "{} in {} has no rows",
                RENTALS_FILE, self.source
            ))),
        }
    }

    fn available_countries(&self) -> Result<Vec<String>> {
        let table = self.table(&self.buildings, BUILDINGS_FILE)?;
        Ok(table
            .by_country
            .keys()
            .cloned()
            .collect())
    }
}

/// Reads every row of a table and checks it against the data model. One bad
/// row fails the whole table.
fn read_table<T: DeserializeOwned + Validate>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        warn!("{} is missing; queries against it will fail", path.display());
        return Ok(None);
    }

    let mut reader = Reader::from_path(path).map_err(|e| {
        AnalysisError::SourceUnavailable(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        let row = result.map_err(|e| {
            AnalysisError::SourceUnavailable(format!(
                "Malformed row {} in {}: {}",
                index + 1,
                path.display(),
                e
            ))
        })?;
        row.validate().map_err(|reason| {
            AnalysisError::SourceUnavailable(format!(
                "Invalid row {} in {}: {}",
                index + 1,
                path.display(),
                reason
            ))
        })?;
        rows.push(row);
    }

    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(Some(rows))
}
