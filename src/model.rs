// Core structs: ProductRecord, CatalogEntry, ComparisonVariant and error types
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validated scrape output: store -> department -> products, in insertion order.
pub type ScrapeResults = IndexMap<String, IndexMap<String, Vec<ProductRecord>>>;

/// Scrape dump as read. Records stay untyped until checked one by one.
pub type RawScrapeResults = IndexMap<String, IndexMap<String, Vec<serde_json::Value>>>;

/// Price, link and image of a product at one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(deserialize_with = "crate::utils::price_as_string")]
    pub product_price: String,
    pub product_link: String,
    pub product_image: String,
}

impl Listing {
    /// Overwrites each field that differs from `incoming`.
    /// Returns true if anything changed.
    pub fn merge(&mut self, incoming: &Listing) -> bool {
        let mut changed = false;
        if self.product_price != incoming.product_price {
            self.product_price = incoming.product_price.clone();
            changed = true;
        }
        if self.product_link != incoming.product_link {
            self.product_link = incoming.product_link.clone();
            changed = true;
        }
        if self.product_image != incoming.product_image {
            self.product_image = incoming.product_image.clone();
            changed = true;
        }
        changed
    }
}

/// One scraped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_name: String,
    pub store_name: String,
    #[serde(flatten)]
    pub listing: Listing,
}

/// Another store's offer for a product catalogued under a different home store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonVariant {
    pub product_name: String,
    pub store_name: String,
    #[serde(flatten)]
    pub listing: Listing,
}

impl From<&ProductRecord> for ComparisonVariant {
    fn from(record: &ProductRecord) -> Self {
        Self {
            product_name: record.product_name.clone(),
            store_name: record.store_name.clone(),
            listing: record.listing.clone(),
        }
    }
}

/// Persistent catalog row, one per distinct product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "productID")]
    pub product_id: String,
    pub product_name: String,
    /// Home store: where the name was first seen.
    pub store_name: String,
    #[serde(flatten)]
    pub listing: Listing,
    pub product_comparison: Vec<ComparisonVariant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Builds a fresh entry whose home store is the record's store.
    pub fn from_record(product_id: String, record: &ProductRecord) -> Self {
        let now = Utc::now();
        Self {
            product_id,
            product_name: record.product_name.clone(),
            store_name: record.store_name.clone(),
            listing: record.listing.clone(),
            product_comparison: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn comparison_at_mut(&mut self, store_name: &str) -> Option<&mut ComparisonVariant> {
        self.product_comparison
            .iter_mut()
            .find(|v| v.store_name == store_name)
    }

    /// Home store first, then comparison stores in append order.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &Listing)> {
        std::iter::once((self.store_name.as_str(), &self.listing)).chain(
            self.product_comparison
                .iter()
                .map(|v| (v.store_name.as_str(), &v.listing)),
        )
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("product '{0}' already exists")]
    Duplicate(String),
    #[error("product id {0} not found")]
    NotFound(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read scrape results: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scrape results: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum InvalidRecord {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record has no product name")]
    Unnamed,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("lookup of '{product}' at {store} failed: {source}")]
    LookupFailure {
        product: String,
        store: String,
        #[source]
        source: StorageError,
    },
    #[error("creating '{product}' at {store} failed: {source}")]
    CreationConflict {
        product: String,
        store: String,
        #[source]
        source: StorageError,
    },
    #[error("saving '{product}' at {store} failed: {source}")]
    PersistFailure {
        product: String,
        store: String,
        #[source]
        source: StorageError,
    },
    #[error("batch failed: {0}")]
    BatchFailure(#[from] SourceError),
}
