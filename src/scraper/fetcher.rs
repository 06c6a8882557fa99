use crate::model::{RawScrapeResults, SourceError};
use crate::scraper::traits::ScrapeSource;
use std::path::PathBuf;
use tracing::info;

/// Reads scrape results from a JSON dump written by the scraping layer.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ScrapeSource for JsonFileSource {
    async fn fetch(&self) -> Result<RawScrapeResults, SourceError> {
        info!("Loading scrape results from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let results: RawScrapeResults = serde_json::from_str(&content)?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("store-catalog-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn reads_stores_in_file_order() {
        let path = temp_file(
            "order.json",
            r#"{
                "QFC": { "produce": [
                    { "productName": "Oranges", "storeName": "QFC", "productPrice": "2.29",
                      "productLink": "l", "productImage": "i" }
                ] },
                "FredMeyer": { "produce": [], "bakery": [] }
            }"#,
        );
        let results = JsonFileSource::new(&path).fetch().await.unwrap();
        let stores: Vec<&String> = results.keys().collect();
        assert_eq!(stores, vec!["QFC", "FredMeyer"]);
        let departments: Vec<&String> = results["FredMeyer"].keys().collect();
        assert_eq!(departments, vec!["produce", "bakery"]);
        assert_eq!(results["QFC"]["produce"][0]["productName"], "Oranges");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn bad_record_does_not_fail_the_dump() {
        let path = temp_file(
            "null-price.json",
            r#"{ "QFC": { "produce": [
                { "productName": "Oranges", "storeName": "QFC", "productPrice": "2.29",
                  "productLink": "l", "productImage": "i" },
                { "productName": "Kale", "storeName": "QFC", "productPrice": null,
                  "productLink": "l", "productImage": "i" },
                { "productName": "Milk", "storeName": "QFC", "productPrice": 3.49,
                  "productLink": "l", "productImage": "i" }
            ] } }"#,
        );
        let results = JsonFileSource::new(&path).fetch().await.unwrap();
        assert_eq!(results["QFC"]["produce"].len(), 3);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn malformed_shape_is_json_error() {
        let path = temp_file("bad.json", r#"{ "QFC": [ "not", "a", "department map" ] }"#);
        let err = JsonFileSource::new(&path).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = JsonFileSource::new("/nonexistent/scrape.json").fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
