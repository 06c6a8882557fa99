use crate::model::{InvalidRecord, ProductRecord, RawScrapeResults, ScrapeResults};
use serde_json::Value;
use tracing::warn;

/// Validates records at the input boundary, one at a time.
/// Records that do not form a `ProductRecord` or have no product name are
/// dropped with a warning, records without a store name take the store key
/// they were listed under. Returns the validated batch and the number dropped.
pub fn normalize_all(raw: RawScrapeResults) -> (ScrapeResults, usize) {
    let mut results = ScrapeResults::new();
    let mut dropped = 0;

    for (store, departments) in raw {
        let validated = results.entry(store.clone()).or_default();
        for (department, products) in departments {
            let mut records = Vec::with_capacity(products.len());
            for value in products {
                let label = value
                    .get("productName")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed>")
                    .to_string();
                match normalize_record(value, &store) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!("Dropping '{}' in {}/{}: {}", label, store, department, e);
                        dropped += 1;
                    }
                }
            }
            validated.insert(department, records);
        }
    }

    (results, dropped)
}

fn normalize_record(mut value: Value, store: &str) -> Result<ProductRecord, InvalidRecord> {
    if let Some(fields) = value.as_object_mut() {
        let blank_store = fields
            .get("storeName")
            .and_then(Value::as_str)
            .is_none_or(|s| s.trim().is_empty());
        if blank_store {
            fields.insert("storeName".to_string(), Value::String(store.to_string()));
        }
    }

    let record: ProductRecord = serde_json::from_value(value)?;
    if record.product_name.trim().is_empty() {
        return Err(InvalidRecord::Unnamed);
    }
    Ok(record)
}
