//! # Catalog Module
//!
//! The NamingSystem catalog as seen by the resolution pipeline.
//!
//! - `CatalogSearch`: the async search capability, the pipeline's only I/O
//! - `CatalogStore`: synchronous maintenance of a local catalog
//!
//! Two local backends implement both traits:
//! - `MemoryCatalog`: in-memory `BTreeMap` (fast, volatile)
//! - `RedbCatalog`: disk-backed redb database (see `storage`)

mod memory;

pub use memory::MemoryCatalog;

use crate::types::{PreferredIdError, CatalogQuery, CatalogRecord, SearchScope};
use async_trait::async_trait;

/// Search a catalog for records carrying a unique id value.
///
/// Implementations return matches in their own authoritative order; an
/// empty vector means "not found" and is not an error. Failures are not
/// retried by the caller.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(
        &self,
        query: &CatalogQuery,
        scope: &SearchScope,
    ) -> Result<Vec<CatalogRecord>, PreferredIdError>;
}

/// Local catalog maintenance shared by the in-memory and redb backends.
pub trait CatalogStore {
    /// Insert or replace a record (keyed by id). Validates first.
    fn insert(&mut self, record: CatalogRecord) -> Result<(), PreferredIdError>;

    /// Remove a record. Returns the removed record, if any.
    fn remove(&mut self, id: &str) -> Result<Option<CatalogRecord>, PreferredIdError>;

    /// Get a record by id.
    fn get(&self, id: &str) -> Result<Option<CatalogRecord>, PreferredIdError>;

    /// All records with a unique id equal to `value`, ordered by record id.
    fn find_by_value(&self, value: &str) -> Result<Vec<CatalogRecord>, PreferredIdError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, PreferredIdError>;

    /// All records ordered by id.
    fn records(&self) -> Result<Vec<CatalogRecord>, PreferredIdError>;

    fn is_empty(&self) -> Result<bool, PreferredIdError> {
        Ok(self.len()? == 0)
    }

    /// Insert every record, stopping at the first invalid one.
    /// Returns the number inserted.
    fn insert_all(&mut self, records: Vec<CatalogRecord>) -> Result<usize, PreferredIdError> {
        let mut count = 0;
        for record in records {
            self.insert(record)?;
            count += 1;
        }
        Ok(count)
    }
}
