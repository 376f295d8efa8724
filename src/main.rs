use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;
use warp::Filter;

use rental_growth::config::AppConfig;
use rental_growth::handlers::SharedAnalyzer;
use rental_growth::routes;
use rental_growth::services::{CsvRecordStore, GrowthCalculator, PortfolioAnalyzer, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr();
    info!("Will bind to: {}", addr);

    info!("Loading data from {}", config.data_dir.display());
    let store: Arc<dyn RecordStore> = Arc::new(CsvRecordStore::open(&config.data_dir)?);
    let analyzer: SharedAnalyzer = Arc::new(PortfolioAnalyzer::new(store, GrowthCalculator::new()));

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(analyzer).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
