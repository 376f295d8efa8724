// src/services/analyzer.rs
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::errors::{AnalysisError, Result};
use crate::models::{
    AnalysisResponse, AnalysisWindow, AnalysisYears, DateRange, GrowthMetrics, PortfolioSummary,
    RentalIncome,
};
use crate::services::calculator::GrowthCalculator;
use crate::services::store::{normalize_country, RecordFilter, RecordStore};

/// Rental totals at the two window boundaries plus coverage of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalAggregate {
    pub start_period_total: f64,
    pub end_period_total: f64,
    pub currency: String,
    pub total_months: usize,
}

/// Answers "how did rent grow against inflation over the trailing N years" for
/// one country's portfolio.
pub struct PortfolioAnalyzer<S: RecordStore + ?Sized> {
    store: Arc<S>,
    calculator: GrowthCalculator,
}

impl<S: RecordStore + ?Sized> PortfolioAnalyzer<S> {
    pub fn new(store: Arc<S>, calculator: GrowthCalculator) -> Self {
        PortfolioAnalyzer { store, calculator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn analyze(&self, country_code: &str, years: u32) -> Result<AnalysisResponse> {
        let country_code = validate_country_code(country_code)?;
        let years = AnalysisYears::try_from(years)?;
        info!("Analyzing {} over {} year(s)", country_code, years);

        let window = self.resolve_window(&country_code, years)?;
        debug!("Resolved window {:?}", window);

        let rentals = self.aggregate_rentals(&window)?;
        let inflation_rates = self.inflation_rates(&window)?;

        let nominal_cagr = self.calculator.compute_cagr(
            rentals.start_period_total,
            rentals.end_period_total,
            years.get() as f64,
        )?;
        let cumulative_inflation = self
            .calculator
            .compute_cumulative_compounding(&inflation_rates)?;
        let real_cagr = self
            .calculator
            .compute_real_cagr(nominal_cagr, cumulative_inflation)?;
        debug!(
            "{}: nominal CAGR {:.6}, cumulative inflation {:.6}, real CAGR {:.6}",
            country_code, nominal_cagr, cumulative_inflation, real_cagr
        );

        let buildings_analyzed = self.store.fetch_buildings(Some(&country_code))?.len();

        Ok(AnalysisResponse {
            date_range: DateRange::from(&window),
            country_code,
            analysis_period_years: years,
            rental_income: RentalIncome {
                start_period_total: rentals.start_period_total,
                end_period_total: rentals.end_period_total,
                currency: rentals.currency,
            },
            growth_metrics: GrowthMetrics {
                nominal_cagr_percent: nominal_cagr * 100.0,
                cumulative_inflation_percent: cumulative_inflation * 100.0,
                real_cagr_percent: real_cagr * 100.0,
            },
            portfolio_summary: PortfolioSummary {
                buildings_analyzed,
                total_months: rentals.total_months,
            },
        })
    }

    /// `years` complete calendar years ending with the latest year of rental
    /// data for the country.
    pub fn resolve_window(
        &self,
        country_code: &str,
        years: AnalysisYears,
    ) -> Result<AnalysisWindow> {
        let (first_year, last_year) = self
            .store
            .available_year_range(Some(country_code))
            .map_err(|e| {
                warn!("Year range lookup failed for {}: {}", country_code, e);
                AnalysisError::NoDataFound(format!("No data found for country {}", country_code))
            })?;

        let start_year = last_year - years.get() as i32 + 1;
        if start_year < first_year {
            return Err(AnalysisError::InsufficientData(format!(
                "{}-year analysis needs data from {}, but data is available from {} to {}",
                years, start_year, first_year, last_year
            )));
        }

        let start = calendar_date(start_year, 1, 1)?;
        let end = calendar_date(last_year, 12, 31)?;

        Ok(AnalysisWindow {
            country_code: country_code.to_string(),
            years,
            start,
            end,
        })
    }

    /// Sums January of the first year and December of the last year.
    pub fn aggregate_rentals(&self, window: &AnalysisWindow) -> Result<RentalAggregate> {
        let country = &window.country_code;
        let start_year = window.start.year();
        let end_year = window.end.year();

        let rows = self.store.fetch_rentals(
            &RecordFilter::new()
                .country(country)
                .years(start_year, end_year),
        )?;
        if rows.is_empty() {
            return Err(AnalysisError::NoDataFound(format!(
                "No data found for country {}",
                country
            )));
        }

        let mut start_total = BoundaryTotal::default();
        let mut end_total = BoundaryTotal::default();
        let mut months = BTreeSet::new();

        for row in &rows {
            if row.year == start_year && row.month == 1 {
                start_total.add(row.rental_amount);
            }
            if row.year == end_year && row.month == 12 {
                end_total.add(row.rental_amount);
            }
            months.insert((row.year, row.month));
        }

        start_total.require(country, start_year, 1)?;
        end_total.require(country, end_year, 12)?;

        // Currency is uniform per country; the first row stands for all.
        let currency = rows[0].currency.clone();

        Ok(RentalAggregate {
            start_period_total: start_total.sum,
            end_period_total: end_total.sum,
            currency,
            total_months: months.len(),
        })
    }

    /// Monthly rates across the window in chronological order.
    pub fn inflation_rates(&self, window: &AnalysisWindow) -> Result<Vec<f64>> {
        let start_year = window.start.year();
        let end_year = window.end.year();

        let mut rows = self.store.fetch_inflation(
            &RecordFilter::new()
                .country(&window.country_code)
                .years(start_year, end_year),
        )?;
        if rows.is_empty() {
            return Err(AnalysisError::NoDataFound(format!(
                "No inflation data for {} between {} and {}",
                window.country_code, start_year, end_year
            )));
        }

        rows.sort_by_key(|i| (i.year, i.month));
        Ok(rows.into_iter().map(|i| i.inflation_rate).collect())
    }
}

#[derive(Debug, Default)]
struct BoundaryTotal {
    sum: f64,
    observations: usize,
}

impl BoundaryTotal {
    fn add(&mut self, amount: f64) {
        self.sum += amount;
        self.observations += 1;
    }

    fn require(&self, country: &str, year: i32, month: u32) -> Result<()> {
        if self.observations == 0 {
            return Err(AnalysisError::NoDataFound(format!(
                "No rental data found for {} in {}-{:02}",
                country, year, month
            )));
        }
        if self.sum.is_nan() || self.sum <= 0.0 {
            return Err(AnalysisError::NoDataFound(format!(
                "Rental income for {} in {}-{:02} is not positive across {} observation(s)",
                country, year, month, self.observations
            )));
        }
        Ok(())
    }
}

/// Uppercased code of exactly two ASCII letters.
pub fn validate_country_code(country_code: &str) -> Result<String> {
    if country_code.is_empty() {
        return Err(AnalysisError::InvalidRequest(
            "Country code cannot be empty".to_string(),
        ));
    }
    let length = country_code.chars().count();
    if length != 2 {
        return Err(AnalysisError::InvalidRequest(format!(
            "Country code must be exactly 2 characters, got {}",
            length
        )));
    }
    if !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AnalysisError::InvalidRequest(
            "Country code must contain only letters".to_string(),
        ));
    }
    Ok(normalize_country(country_code))
}

/// Years come from stored rows, so an unrepresentable one is a data problem.
fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AnalysisError::SourceUnavailable(format!(
            "Stored year {} is outside the supported calendar range",
            year
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildingRecord, InflationRecord, RentalRecord};
    use crate::services::store::CsvRecordStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rental(building: &str, year: i32, month: u32, amount: f64) -> RentalRecord {
        RentalRecord {
            building_id: building.into(),
            tenant_id: format!("{}-T", building),
            country_code: "US".into(),
            month,
            year,
            rental_amount: amount,
            currency: "USD".into(),
        }
    }

    fn building(id: &str) -> BuildingRecord {
        BuildingRecord {
            building_id: id.into(),
            country_code: "US".into(),
            name: format!("{} Plaza", id),
            property_type: "Retail".into(),
            city: "Chicago".into(),
        }
    }

    /// Two buildings, every month of `first..=last`, rent rising 1% a month.
    fn monthly_store(first: i32, last: i32, inflation_rate: f64) -> CsvRecordStore {
        let mut rentals = Vec::new();
        let mut inflation = Vec::new();
        let mut step = 0;
        for year in first..=last {
            for month in 1..=12 {
                let amount = 1000.0 * 1.01f64.powi(step);
                rentals.push(rental("B1", year, month, amount));
                rentals.push(rental("B2", year, month, amount * 2.0));
                inflation.push(InflationRecord {
                    country_code: "US".into(),
                    year,
                    month,
                    inflation_rate,
                });
                step += 1;
            }
        }
        CsvRecordStore::from_records(
            vec![building("B1"), building("B2"), building("B3")],
            rentals,
            inflation,
        )
    }

    fn analyzer(store: CsvRecordStore) -> PortfolioAnalyzer<CsvRecordStore> {
        PortfolioAnalyzer::new(Arc::new(store), GrowthCalculator::new())
    }

    #[test]
    fn one_year_window_uses_latest_year() {
        let result = analyzer(monthly_store(2020, 2024, 0.0)).analyze("us", 1).unwrap();
        assert_eq!(result.country_code, "US");
        assert_eq!(result.date_range.start_date, "2024-01");
        assert_eq!(result.date_range.end_date, "2024-12");
        assert_eq!(result.portfolio_summary.total_months, 12);
        assert_eq!(result.portfolio_summary.buildings_analyzed, 3);
        assert_eq!(result.rental_income.currency, "USD");

        // Jan..Dec of one year is 11 monthly steps of 1%.
        let expected = (1.01f64.powi(11) - 1.0) * 100.0;
        assert!((result.growth_metrics.nominal_cagr_percent - expected).abs() < 1e-9);
        assert!((result.growth_metrics.real_cagr_percent - expected).abs() < 1e-9);
        assert_eq!(result.growth_metrics.cumulative_inflation_percent, 0.0);
    }

    #[test]
    fn boundary_totals_sum_every_building() {
        let a = analyzer(monthly_store(2022, 2024, 0.0));
        let window = a.resolve_window("US", AnalysisYears::Three).unwrap();
        let totals = a.aggregate_rentals(&window).unwrap();
        assert!((totals.start_period_total - 3000.0).abs() < 1e-9);
        assert!((totals.end_period_total - 3000.0 * 1.01f64.powi(35)).abs() < 1e-6);
        assert_eq!(totals.total_months, 36);
    }

    #[test]
    fn inflation_feeds_real_cagr() {
        let result = analyzer(monthly_store(2024, 2024, 0.002)).analyze("US", 1).unwrap();
        let cumulative = 1.002f64.powi(12) - 1.0;
        let cumulative_percent = result.growth_metrics.cumulative_inflation_percent;
        assert!((cumulative_percent - cumulative * 100.0).abs() < 1e-9);
        let nominal = result.growth_metrics.nominal_cagr_percent / 100.0;
        let real = (1.0 + nominal) / (1.0 + cumulative) - 1.0;
        assert!((result.growth_metrics.real_cagr_percent - real * 100.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_invalid_requests() {
        let a = analyzer(monthly_store(2020, 2024, 0.0));
        for years in [0, 2, 7, 11] {
            assert!(matches!(a.analyze("US", years), Err(AnalysisError::InvalidRequest(_))));
        }
        for code in ["", "U", "USA", "U1", "ü1"] {
            assert!(matches!(a.analyze(code, 1), Err(AnalysisError::InvalidRequest(_))));
        }
    }

    #[test]
    fn insufficient_history() {
        let err = analyzer(monthly_store(2022, 2024, 0.0)).analyze("US", 5).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn unknown_country_is_no_data() {
        let err = analyzer(monthly_store(2022, 2024, 0.0)).analyze("FR", 1).unwrap_err();
        assert_eq!(err, AnalysisError::NoDataFound("No data found for country FR".into()));
    }

    #[test]
    fn missing_boundary_month_is_no_data() {
        let mut rentals: Vec<RentalRecord> =
            (2..=12).map(|m| rental("B1", 2024, m, 100.0)).collect();
        rentals.push(rental("B1", 2023, 12, 100.0));
        let store = CsvRecordStore::from_records(vec![building("B1")], rentals, vec![]);
        let err = analyzer(store).analyze("US", 1).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NoDataFound("No rental data found for US in 2024-01".into())
        );
    }

    #[test]
    fn zero_boundary_total_is_no_data() {
        let rentals = vec![rental("B1", 2024, 1, 100.0), rental("B1", 2024, 12, 0.0)];
        let store = CsvRecordStore::from_records(vec![building("B1")], rentals, vec![]);
        let err = analyzer(store).analyze("US", 1).unwrap_err();
        match err {
            AnalysisError::NoDataFound(message) => assert!(message.contains("not positive")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn negative_boundary_total_is_no_data() {
        let rentals = vec![
            rental("B1", 2024, 1, 100.0),
            rental("B2", 2024, 1, -250.0),
            rental("B1", 2024, 12, 110.0),
        ];
        let store = CsvRecordStore::from_records(vec![building("B1")], rentals, vec![]);
        let err = analyzer(store).analyze("US", 1).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NoDataFound(
                "Rental income for US in 2024-01 is not positive across 2 observation(s)".into()
            )
        );
    }

    #[test]
    fn unrepresentable_stored_year_is_source_unavailable() {
        let rentals = vec![rental("B1", 300_000, 1, 100.0), rental("B1", 300_000, 12, 110.0)];
        let store = CsvRecordStore::from_records(vec![building("B1")], rentals, vec![]);
        let err = analyzer(store).analyze("US", 1).unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable(_)), "{:?}", err);
    }

    #[test]
    fn empty_inflation_is_no_data() {
        let rentals = vec![rental("B1", 2024, 1, 100.0), rental("B1", 2024, 12, 110.0)];
        let store = CsvRecordStore::from_records(vec![building("B1")], rentals, vec![]);
        let err = analyzer(store).analyze("US", 1).unwrap_err();
        assert!(matches!(err, AnalysisError::NoDataFound(_)));
    }

    #[test]
    fn gaps_reduce_month_count() {
        let rentals = vec![
            rental("B1", 2024, 1, 100.0),
            rental("B1", 2024, 6, 105.0),
            rental("B1", 2024, 12, 110.0),
        ];
        let inflation = vec![InflationRecord {
            country_code: "US".into(),
            year: 2024,
            month: 6,
            inflation_rate: 0.01,
        }];
        let store = CsvRecordStore::from_records(vec![building("B1")], rentals, inflation);
        let result = analyzer(store).analyze("US", 1).unwrap();
        assert_eq!(result.portfolio_summary.total_months, 3);
    }

    #[test]
    fn identical_requests_are_identical() {
        let a = analyzer(monthly_store(2015, 2024, 0.0015));
        let first = serde_json::to_string(&a.analyze("US", 5).unwrap()).unwrap();
        let second = serde_json::to_string(&a.analyze("US", 5).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    struct CountingStore {
        inner: CsvRecordStore,
        calls: AtomicUsize,
    }

    impl RecordStore for CountingStore {
        fn fetch_rentals(&self, filter: &RecordFilter) -> Result<Vec<RentalRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_rentals(filter)
        }

        fn fetch_inflation(&self, filter: &RecordFilter) -> Result<Vec<InflationRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_inflation(filter)
        }

        fn fetch_buildings(&self, country_code: Option<&str>) -> Result<Vec<BuildingRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_buildings(country_code)
        }

        fn available_year_range(&self, country_code: Option<&str>) -> Result<(i32, i32)> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.available_year_range(country_code)
        }

        fn available_countries(&self) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.available_countries()
        }
    }

    #[test]
    fn invalid_years_never_touch_the_store() {
        let store = Arc::new(CountingStore {
            inner: monthly_store(2020, 2024, 0.0),
            calls: AtomicUsize::new(0),
        });
        let a = PortfolioAnalyzer::new(store.clone(), GrowthCalculator::new());
        assert!(matches!(a.analyze("US", 7), Err(AnalysisError::InvalidRequest(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn works_through_a_trait_object() {
        let store: Arc<dyn RecordStore> = Arc::new(monthly_store(2024, 2024, 0.0));
        let a = PortfolioAnalyzer::new(store, GrowthCalculator::new());
        assert!(a.analyze("US", 1).is_ok());
    }
}
