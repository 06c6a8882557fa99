use crate::model::{RawScrapeResults, SourceError};
use std::path::Path;
use tracing::info;

/// Dumps scrape results as pretty JSON for debugging scraper output.
/// Records are written as read, including ones the normalizer will drop.
pub fn export_scrape_results(results: &RawScrapeResults, path: &Path) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    info!("Saved scrape results: {}", path.display());
    Ok(())
}
