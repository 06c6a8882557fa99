use crate::model::{CatalogEntry, ComparisonVariant, Listing, StorageError};
use crate::storage::CatalogStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use tokio::sync::Mutex;

const ENTRY_COLUMNS: &str = "product_id, product_name, store_name, product_price, product_link,
     product_image, created_at, updated_at";

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens the catalog database and creates the tables if needed.
    pub fn open(db_path: &str) -> Result<Self, StorageError> {
        Self::init(Connection::open(db_path)?)
    }

    /// In-memory catalog, used by tests.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS products (
                product_id TEXT PRIMARY KEY,
                product_name TEXT NOT NULL UNIQUE,
                store_name TEXT NOT NULL,
                product_price TEXT NOT NULL,
                product_link TEXT NOT NULL,
                product_image TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS product_comparison (
                product_id TEXT NOT NULL REFERENCES products(product_id),
                position INTEGER NOT NULL,
                product_name TEXT NOT NULL,
                store_name TEXT NOT NULL,
                product_price TEXT NOT NULL,
                product_link TEXT NOT NULL,
                product_image TEXT NOT NULL,
                PRIMARY KEY (product_id, store_name)
            );
            "
        )?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Returns every catalog entry, ordered by product name.
    pub async fn all_entries(&self) -> Result<Vec<CatalogEntry>, StorageError> {
        let conn = self.conn.lock().await;

        let mut variants: HashMap<String, Vec<ComparisonVariant>> = HashMap::new();
        let mut stmt = conn.prepare(
            "SELECT product_id, product_name, store_name, product_price, product_link, product_image
             FROM product_comparison ORDER BY product_id, position",
        )?;
        let rows = stmt.query_map([], |row| {
            let product_id: String = row.get(0)?;
            Ok((product_id, Self::map_variant(row, 1)?))
        })?;
        for row in rows {
            let (product_id, variant) = row?;
            variants.entry(product_id).or_default().push(variant);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM products ORDER BY product_name ASC",
            ENTRY_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            let mut entry = row?;
            entry.product_comparison = variants.remove(&entry.product_id).unwrap_or_default();
            entries.push(entry);
        }

        Ok(entries)
    }

    fn load_comparisons(conn: &Connection, product_id: &str) -> Result<Vec<ComparisonVariant>, StorageError> {
        let mut stmt = conn.prepare(
            "SELECT product_name, store_name, product_price, product_link, product_image
             FROM product_comparison WHERE product_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![product_id], |row| Self::map_variant(row, 0))?;

        let mut variants = Vec::new();
        for row in rows {
            variants.push(row?);
        }
        Ok(variants)
    }

    fn map_entry(row: &Row) -> Result<CatalogEntry, rusqlite::Error> {
        Ok(CatalogEntry {
            product_id: row.get(0)?,
            product_name: row.get(1)?,
            store_name: row.get(2)?,
            listing: Listing {
                product_price: row.get(3)?,
                product_link: row.get(4)?,
                product_image: row.get(5)?,
            },
            product_comparison: Vec::new(),
            created_at: Self::parse_timestamp(row, 6)?,
            updated_at: Self::parse_timestamp(row, 7)?,
        })
    }

    fn map_variant(row: &Row, offset: usize) -> Result<ComparisonVariant, rusqlite::Error> {
        Ok(ComparisonVariant {
            product_name: row.get(offset)?,
            store_name: row.get(offset + 1)?,
            listing: Listing {
                product_price: row.get(offset + 2)?,
                product_link: row.get(offset + 3)?,
                product_image: row.get(offset + 4)?,
            },
        })
    }

    fn parse_timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
        let raw: String = row.get(idx)?;
        raw.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[async_trait::async_trait]
impl CatalogStore for SqliteStorage {
    async fn retrieve_by_name(&self, name: &str) -> Result<Option<CatalogEntry>, StorageError> {
        let conn = self.conn.lock().await;

        let entry = conn
            .query_row(
                &format!("SELECT {} FROM products WHERE product_name = ?1", ENTRY_COLUMNS),
                params![name],
                Self::map_entry,
            )
            .optional()?;

        match entry {
            Some(mut entry) => {
                entry.product_comparison = Self::load_comparisons(&conn, &entry.product_id)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn exists_at_store(&self, name: &str, store_name: &str) -> Result<bool, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT 1 FROM products WHERE product_name = ?1 AND store_name = ?2")?;
        let mut rows = stmt.query(params![name, store_name])?;
        Ok(rows.next()?.is_some())
    }

    async fn create(&self, entry: CatalogEntry) -> Result<CatalogEntry, StorageError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO products (
                product_id, product_name, store_name, product_price, product_link,
                product_image, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &entry.product_id,
                &entry.product_name,
                &entry.store_name,
                &entry.listing.product_price,
                &entry.listing.product_link,
                &entry.listing.product_image,
                &entry.created_at.to_rfc3339(),
                &entry.updated_at.to_rfc3339(),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(StorageError::Duplicate(entry.product_name.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        insert_comparisons(&tx, &entry)?;
        tx.commit()?;
        Ok(entry)
    }

    async fn save(&self, entry: &CatalogEntry) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        // Name and home store are fixed at creation.
        let updated = tx.execute(
            "UPDATE products
             SET product_price = ?2, product_link = ?3, product_image = ?4, updated_at = ?5
             WHERE product_id = ?1",
            params![
                &entry.product_id,
                &entry.listing.product_price,
                &entry.listing.product_link,
                &entry.listing.product_image,
                &Utc::now().to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(entry.product_id.clone()));
        }

        tx.execute(
            "DELETE FROM product_comparison WHERE product_id = ?1",
            params![&entry.product_id],
        )?;
        insert_comparisons(&tx, entry)?;

        tx.commit()?;
        Ok(())
    }
}

fn insert_comparisons(conn: &Connection, entry: &CatalogEntry) -> Result<(), StorageError> {
    let mut stmt = conn.prepare(
        "INSERT INTO product_comparison (
            product_id, position, product_name, store_name,
            product_price, product_link, product_image
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, variant) in entry.product_comparison.iter().enumerate() {
        if variant.store_name == entry.store_name {
            return Err(StorageError::Corrupt(format!(
                "comparison for '{}' repeats home store {}",
                entry.product_name, entry.store_name
            )));
        }
        stmt.execute(params![
            &entry.product_id,
            position as i64,
            &variant.product_name,
            &variant.store_name,
            &variant.listing.product_price,
            &variant.listing.product_link,
            &variant.listing.product_image,
        ])
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StorageError::Corrupt(format!(
                    "duplicate comparison store {} for '{}'",
                    variant.store_name, entry.product_name
                ))
            } else {
                e.into()
            }
        })?;
    }
    Ok(())
}
