mod analyzer;
mod config;
mod model;
mod normalizer;
mod reconciler;
mod scraper;
mod storage;
mod utils;

use analyzer::widest_spreads;
use config::{load_config, AppConfig};
use reconciler::Reconciler;
use scraper::JsonFileSource;
use std::path::Path;
use std::sync::Arc;
use storage::SqliteStorage;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let storage = match SqliteStorage::open(&config.database_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    let source = JsonFileSource::new(&config.scrape_results_path);
    let export_path = config.export_path.as_deref().map(Path::new);

    let reconciler = Reconciler::new(storage.clone());
    let summary = match reconciler.run(&source, export_path).await {
        Ok(summary) => summary,
        Err(_) => return,
    };
    if summary.failed > 0 {
        warn!("{} records failed to reconcile, see errors above", summary.failed);
    }

    report_price_spreads(&storage, config.report_limit).await;
}

/// Logs the products with the largest price difference between stores.
async fn report_price_spreads(storage: &SqliteStorage, limit: usize) {
    let entries = match storage.all_entries().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to load catalog for report: {}", e);
            return;
        }
    };

    let compared = entries.iter().filter(|e| !e.product_comparison.is_empty()).count();
    info!("Catalog holds {} products, {} carried by several stores", entries.len(), compared);

    for cmp in widest_spreads(&entries, limit) {
        info!(
            "{}: {:.2} at {} vs {:.2} at {} ({} stores)",
            cmp.product_name,
            cmp.cheapest_price,
            cmp.cheapest_store,
            cmp.priciest_price,
            cmp.priciest_store,
            cmp.store_count
        );
    }
}
