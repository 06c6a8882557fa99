use crate::model::CatalogEntry;
use crate::utils::parse_price;

/// Cheapest and priciest store for one catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceComparison {
    pub product_name: String,
    pub cheapest_store: String,
    pub cheapest_price: f64,
    pub priciest_store: String,
    pub priciest_price: f64,
    /// Number of stores with a parsable price.
    pub store_count: usize,
}

impl PriceComparison {
    pub fn spread(&self) -> f64 {
        self.priciest_price - self.cheapest_price
    }

    /// Compares every store carrying `entry`. Stores whose price does not parse
    /// are skipped; on equal prices the earlier store (home first) wins.
    pub fn for_entry(entry: &CatalogEntry) -> Option<Self> {
        let mut prices = entry
            .stores()
            .filter_map(|(store, listing)| parse_price(&listing.product_price).map(|p| (store, p)));

        let (first_store, first_price) = prices.next()?;
        let mut result = Self {
            product_name: entry.product_name.clone(),
            cheapest_store: first_store.to_string(),
            cheapest_price: first_price,
            priciest_store: first_store.to_string(),
            priciest_price: first_price,
            store_count: 1,
        };

        for (store, price) in prices {
            result.store_count += 1;
            if price < result.cheapest_price {
                result.cheapest_store = store.to_string();
                result.cheapest_price = price;
            }
            if price > result.priciest_price {
                result.priciest_store = store.to_string();
                result.priciest_price = price;
            }
        }

        Some(result)
    }
}

/// Entries carried by at least two stores, largest spread first, at most `limit`.
pub fn widest_spreads(entries: &[CatalogEntry], limit: usize) -> Vec<PriceComparison> {
    let mut comparisons: Vec<PriceComparison> = entries
        .iter()
        .filter_map(PriceComparison::for_entry)
        .filter(|c| c.store_count >= 2)
        .collect();
    comparisons.sort_by(|a, b| b.spread().total_cmp(&a.spread()));
    comparisons.truncate(limit);
    comparisons
}
