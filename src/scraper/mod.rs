pub mod export;
pub mod fetcher;
pub mod traits;

pub use export::export_scrape_results;
pub use fetcher::JsonFileSource;
pub use traits::ScrapeSource;
