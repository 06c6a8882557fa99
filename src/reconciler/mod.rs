// Reconciliation of scrape results into the product catalog.

pub mod summary;

pub use summary::{Outcome, RunSummary};

use crate::model::{
    CatalogEntry, ComparisonVariant, ProductRecord, ReconcileError, ScrapeResults, StorageError,
};
use crate::normalizer::normalize_all;
use crate::scraper::{export_scrape_results, ScrapeSource};
use crate::storage::CatalogStore;
use crate::utils::generate_product_id;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Merges scraped products into the catalog, one record at a time.
///
/// Records are processed strictly in sequence: looking up a name and creating
/// it are separate store operations, so two records sharing a name must never
/// be in flight together.
pub struct Reconciler<S: CatalogStore> {
    store: Arc<S>,
}

impl<S: CatalogStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetches a batch from `source` once, optionally dumps it to `export`,
    /// validates it record by record and reconciles it.
    /// Only a failure to obtain the batch as a whole is returned.
    pub async fn run(
        &self,
        source: &dyn ScrapeSource,
        export: Option<&Path>,
    ) -> Result<RunSummary, ReconcileError> {
        let raw = match source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                let err = ReconcileError::from(e);
                error!("Failed to update products: {}", err);
                return Err(err);
            }
        };

        if let Some(path) = export {
            if let Err(e) = export_scrape_results(&raw, path) {
                warn!("Failed to export scrape results: {}", e);
            }
        }

        let (results, dropped) = normalize_all(raw);
        let mut summary = self.reconcile(&results).await;
        summary.dropped = dropped;
        Ok(summary)
    }

    /// Walks store -> department -> product in input order.
    pub async fn reconcile(&self, results: &ScrapeResults) -> RunSummary {
        info!("Storing scrape results from {} stores to the catalog...", results.len());
        let mut summary = RunSummary::default();

        for (store, departments) in results {
            for (department, products) in departments {
                debug!("Reconciling {} products from {}/{}", products.len(), store, department);
                for product in products {
                    match self.process_product(product).await {
                        Ok(outcome) => summary.record(outcome),
                        Err(e) => {
                            error!(
                                "Reconcile failed for '{}' at {} ({}): {}",
                                product.product_name, product.store_name, department, e
                            );
                            summary.failed += 1;
                        }
                    }
                }
            }
        }

        info!("Finished storing scrape results: {}", summary);
        summary
    }

    /// Decides whether `product` is a new entry, a home-store update, or a
    /// comparison variant of an existing entry, and persists the result.
    pub async fn process_product(&self, product: &ProductRecord) -> Result<Outcome, ReconcileError> {
        let existing = self
            .store
            .retrieve_by_name(&product.product_name)
            .await
            .map_err(|e| lookup_failure(product, e))?;

        let Some(mut entry) = existing else {
            return self.create_new_product(product).await;
        };

        let at_home = self
            .store
            .exists_at_store(&product.product_name, &product.store_name)
            .await
            .map_err(|e| lookup_failure(product, e))?;

        let outcome = if at_home {
            if entry.listing.merge(&product.listing) {
                Outcome::HomeUpdated
            } else {
                Outcome::Unchanged
            }
        } else {
            match entry.comparison_at_mut(&product.store_name) {
                Some(variant) => {
                    if variant.listing.merge(&product.listing) {
                        Outcome::ComparisonUpdated
                    } else {
                        Outcome::Unchanged
                    }
                }
                None => {
                    entry.product_comparison.push(ComparisonVariant::from(product));
                    Outcome::ComparisonAppended
                }
            }
        };

        if outcome == Outcome::Unchanged {
            debug!("'{}' at {} unchanged", product.product_name, product.store_name);
            return Ok(outcome);
        }

        self.store.save(&entry).await.map_err(|source| ReconcileError::PersistFailure {
            product: product.product_name.clone(),
            store: product.store_name.clone(),
            source,
        })?;
        debug!("'{}' at {}: {:?}", product.product_name, product.store_name, outcome);
        Ok(outcome)
    }

    /// First sighting of a name: the record's store becomes the home store.
    async fn create_new_product(&self, product: &ProductRecord) -> Result<Outcome, ReconcileError> {
        let entry = CatalogEntry::from_record(generate_product_id(), product);
        let created = self.store.create(entry).await.map_err(|source| ReconcileError::CreationConflict {
            product: product.product_name.clone(),
            store: product.store_name.clone(),
            source,
        })?;
        info!("New product '{}' at {} ({})", created.product_name, created.store_name, created.product_id);
        Ok(Outcome::Created)
    }
}

fn lookup_failure(product: &ProductRecord, source: StorageError) -> ReconcileError {
    ReconcileError::LookupFailure {
        product: product.product_name.clone(),
        store: product.store_name.clone(),
        source,
    }
}
