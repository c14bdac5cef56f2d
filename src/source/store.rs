//! Memoized, read-only campus table.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{load_campuses, ColumnNames, SourceLocation};
use crate::error::Result;
use crate::models::CampusTable;

/// Loads the campus table once and hands out shared read-only copies.
///
/// The table lives until `clear` is called or the process exits. Callers
/// that only need to look things up should take `&CampusTable` rather than
/// the store.
pub struct CampusStore {
    location: SourceLocation,
    columns: ColumnNames,
    cached: Mutex<Option<Arc<CampusTable>>>,
}

impl CampusStore {
    pub fn new(location: SourceLocation, columns: ColumnNames) -> Self {
        Self {
            location,
            columns,
            cached: Mutex::new(None),
        }
    }

    /// Store pre-populated with an already loaded table
    pub fn with_table(location: SourceLocation, columns: ColumnNames, table: CampusTable) -> Self {
        Self {
            location,
            columns,
            cached: Mutex::new(Some(Arc::new(table))),
        }
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Cached table, loading it on first use
    pub async fn table(&self) -> Result<Arc<CampusTable>> {
        // Held across the load so concurrent first callers fetch once
        let mut cached = self.cached.lock().await;
        if let Some(table) = cached.as_ref() {
            debug!("Campus table served from cache");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_campuses(&self.location, &self.columns).await?);
        *cached = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table; the next `table()` call reloads
    pub async fn clear(&self) {
        let mut cached = self.cached.lock().await;
        if cached.take().is_some() {
            info!("Cleared cached campus table");
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.cached.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use tempfile::NamedTempFile;

    fn write_csv(file: &NamedTempFile, body: &str) {
        std::fs::write(file.path(), body).unwrap();
    }

    fn store_for(file: &NamedTempFile) -> CampusStore {
        CampusStore::new(
            SourceLocation::Local(file.path().to_path_buf()),
            ColumnNames::default(),
        )
    }

    #[tokio::test]
    async fn test_loads_once_until_cleared() {
        let file = NamedTempFile::new().unwrap();
        write_csv(&file, "LABEL,LON,LAT\nA,-118.25,34.05\n");
        let store = store_for(&file);

        assert!(!store.is_loaded().await);
        assert_eq!(store.table().await.unwrap().len(), 1);
        assert!(store.is_loaded().await);

        // Source changes are not observed while cached
        write_csv(&file, "LABEL,LON,LAT\nA,-118.25,34.05\nB,-118.3,34.1\n");
        assert_eq!(store.table().await.unwrap().len(), 1);

        store.clear().await;
        assert!(!store.is_loaded().await);
        assert_eq!(store.table().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let file = NamedTempFile::new().unwrap();
        write_csv(&file, "LABEL,LON\nA,-118.25\n");
        let store = store_for(&file);

        assert!(matches!(
            store.table().await,
            Err(MapError::MissingColumn(_))
        ));
        assert!(!store.is_loaded().await);

        write_csv(&file, "LABEL,LON,LAT\nA,-118.25,34.05\n");
        assert_eq!(store.table().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_with_table_skips_loading() {
        let store = CampusStore::with_table(
            SourceLocation::Local("/nonexistent.csv".into()),
            ColumnNames::default(),
            CampusTable::default(),
        );
        assert!(store.table().await.unwrap().is_empty());
    }
}
