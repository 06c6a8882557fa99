use crate::model::{RawScrapeResults, SourceError};

/// Producer of raw scrape output, nested as store -> department -> products.
/// Only the nesting is checked here, records are validated by the normalizer.
#[async_trait::async_trait]
pub trait ScrapeSource: Send + Sync {
    async fn fetch(&self) -> Result<RawScrapeResults, SourceError>;
}
