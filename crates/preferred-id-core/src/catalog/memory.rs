//! In-memory catalog backend.

use super::{CatalogSearch, CatalogStore};
use crate::types::{PreferredIdError, CatalogQuery, CatalogRecord, SearchScope};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Catalog held in a `BTreeMap` keyed by record id.
///
/// Searches scan every record, which is fine for the catalog sizes this
/// backend is meant for (seed files, tests).
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: BTreeMap<String, CatalogRecord>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records, validating each.
    pub fn from_records(records: Vec<CatalogRecord>) -> Result<Self, PreferredIdError> {
        let mut catalog = Self::new();
        catalog.insert_all(records)?;
        Ok(catalog)
    }
}

impl CatalogStore for MemoryCatalog {
    fn insert(&mut self, record: CatalogRecord) -> Result<(), PreferredIdError> {
        record.validate()?;
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<Option<CatalogRecord>, PreferredIdError> {
        Ok(self.records.remove(id))
    }

    fn get(&self, id: &str) -> Result<Option<CatalogRecord>, PreferredIdError> {
        Ok(self.records.get(id).cloned())
    }

    fn find_by_value(&self, value: &str) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        Ok(self
            .records
            .values()
            .filter(|r| r.has_value(value))
            .cloned()
            .collect())
    }

    fn len(&self) -> Result<usize, PreferredIdError> {
        Ok(self.records.len())
    }

    fn records(&self) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        Ok(self.records.values().cloned().collect())
    }
}

#[async_trait]
impl CatalogSearch for MemoryCatalog {
    async fn search(
        &self,
        query: &CatalogQuery,
        _scope: &SearchScope,
    ) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        self.find_by_value(&query.value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
