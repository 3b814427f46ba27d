//! # redb-backed Catalog Storage
//!
//! A disk-backed NamingSystem catalog using the redb embedded database.
//!
//! Layout:
//! - `records`: record id -> postcard-encoded `CatalogRecord`
//! - `value_index`: unique id value -> postcard-encoded sorted list of
//!   record ids carrying that value
//!
//! Every insert or removal rewrites the record and its index entries in a
//! single write transaction, so the index never points at a missing record.
//! Searches read one index entry and then the referenced records, returning
//! them ordered by id.

use crate::catalog::{CatalogSearch, CatalogStore};
use crate::types::{PreferredIdError, CatalogQuery, CatalogRecord, SearchScope};
use async_trait::async_trait;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
};
use std::collections::BTreeSet;
use std::path::Path;

/// Table for records: id -> serialized CatalogRecord bytes
const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

/// Table for the value index: unique id value -> serialized Vec<String> of ids
const VALUE_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("value_index");

fn io_err(e: impl std::fmt::Display) -> PreferredIdError {
    PreferredIdError::IoError(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, PreferredIdError> {
    postcard::to_allocvec(value).map_err(|e| PreferredIdError::SerializationError(e.to_string()))
}

fn decode<'de, T: serde::Deserialize<'de>>(bytes: &'de [u8]) -> Result<T, PreferredIdError> {
    postcard::from_bytes(bytes).map_err(|e| PreferredIdError::DeserializationError(e.to_string()))
}

/// A disk-backed catalog store using redb.
pub struct RedbCatalog {
    db: Database,
}

impl std::fmt::Debug for RedbCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbCatalog").finish_non_exhaustive()
    }
}

impl RedbCatalog {
    /// Open or create a catalog database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferredIdError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(RECORDS).map_err(io_err)?;
            let _ = write_txn.open_table(VALUE_INDEX).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        Ok(Self { db })
    }

    /// Distinct unique id values of a record.
    fn values_of(record: &CatalogRecord) -> BTreeSet<&str> {
        record.unique_ids.iter().map(|u| u.value.as_str()).collect()
    }

    fn index_ids(
        table: &Table<'_, &'static str, &'static [u8]>,
        value: &str,
    ) -> Result<Vec<String>, PreferredIdError> {
        match table.get(value).map_err(io_err)? {
            Some(data) => decode(data.value()),
            None => Ok(Vec::new()),
        }
    }

    fn index_add(
        table: &mut Table<'_, &'static str, &'static [u8]>,
        value: &str,
        id: &str,
    ) -> Result<(), PreferredIdError> {
        let mut ids = Self::index_ids(table, value)?;
        if let Err(pos) = ids.binary_search_by(|probe| probe.as_str().cmp(id)) {
            ids.insert(pos, id.to_string());
            let bytes = encode(&ids)?;
            table.insert(value, bytes.as_slice()).map_err(io_err)?;
        }
        Ok(())
    }

    fn index_remove(
        table: &mut Table<'_, &'static str, &'static [u8]>,
        value: &str,
        id: &str,
    ) -> Result<(), PreferredIdError> {
        let mut ids = Self::index_ids(table, value)?;
        ids.retain(|existing| existing != id);
        if ids.is_empty() {
            table.remove(value).map_err(io_err)?;
        } else {
            let bytes = encode(&ids)?;
            table.insert(value, bytes.as_slice()).map_err(io_err)?;
        }
        Ok(())
    }

    /// Remove `id` and its index entries inside an open write transaction.
    fn remove_in(
        records_table: &mut Table<'_, &'static str, &'static [u8]>,
        index_table: &mut Table<'_, &'static str, &'static [u8]>,
        id: &str,
    ) -> Result<Option<CatalogRecord>, PreferredIdError> {
        let existing: Option<CatalogRecord> = match records_table.get(id).map_err(io_err)? {
            Some(data) => Some(decode(data.value())?),
            None => None,
        };

        if let Some(ref old) = existing {
            for value in Self::values_of(old) {
                Self::index_remove(index_table, value, id)?;
            }
            records_table.remove(id).map_err(io_err)?;
        }
        Ok(existing)
    }
}

impl CatalogStore for RedbCatalog {
    fn insert(&mut self, record: CatalogRecord) -> Result<(), PreferredIdError> {
        record.validate()?;
        let record_bytes = encode(&record)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut records_table = write_txn.open_table(RECORDS).map_err(io_err)?;
            let mut index_table = write_txn.open_table(VALUE_INDEX).map_err(io_err)?;

            Self::remove_in(&mut records_table, &mut index_table, &record.id)?;

            records_table
                .insert(record.id.as_str(), record_bytes.as_slice())
                .map_err(io_err)?;
            for value in Self::values_of(&record) {
                Self::index_add(&mut index_table, value, &record.id)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<Option<CatalogRecord>, PreferredIdError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let removed = {
            let mut records_table = write_txn.open_table(RECORDS).map_err(io_err)?;
            let mut index_table = write_txn.open_table(VALUE_INDEX).map_err(io_err)?;
            Self::remove_in(&mut records_table, &mut index_table, id)?
        };
        write_txn.commit().map_err(io_err)?;
        Ok(removed)
    }

    fn get(&self, id: &str) -> Result<Option<CatalogRecord>, PreferredIdError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let records_table = read_txn.open_table(RECORDS).map_err(io_err)?;

        match records_table.get(id).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn find_by_value(&self, value: &str) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let index_table = read_txn.open_table(VALUE_INDEX).map_err(io_err)?;
        let records_table = read_txn.open_table(RECORDS).map_err(io_err)?;

        let ids: Vec<String> = match index_table.get(value).map_err(io_err)? {
            Some(data) => decode(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(data) = records_table.get(id.as_str()).map_err(io_err)? {
                records.push(decode(data.value())?);
            }
        }
        Ok(records)
    }

    fn len(&self) -> Result<usize, PreferredIdError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let records_table = read_txn.open_table(RECORDS).map_err(io_err)?;
        let count = records_table.len().map_err(io_err)?;
        Ok(count as usize)
    }

    fn records(&self) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let records_table = read_txn.open_table(RECORDS).map_err(io_err)?;

        let mut records = Vec::new();
        for entry in records_table.iter().map_err(io_err)? {
            let (_key, value) = entry.map_err(io_err)?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }
}

#[async_trait]
impl CatalogSearch for RedbCatalog {
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{InformationModel, UniqueId};
    use tempfile::tempdir;

    fn record(id: &str, values: &[&str]) -> CatalogRecord {
        values.iter().fold(
            CatalogRecord::new(id, id, InformationModel::r4()),
            |r, v| r.with_unique_id(UniqueId::uri(*v)),
        )
    }

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog.insert(record("a", &["urn:a"])).expect("insert");
        catalog.insert(record("b", &["urn:b"])).expect("insert");

        assert_eq!(catalog.len().expect("len"), 2);
        let found = catalog.find_by_value("urn:b").expect("find");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");
        assert!(catalog.find_by_value("urn:c").expect("find").is_empty());
    }

    #[test]
    fn persistence() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut catalog = RedbCatalog::open(&db_path).expect("open db");
            catalog.insert(record("a", &["urn:a"])).expect("insert");
        }

        {
            let catalog = RedbCatalog::open(&db_path).expect("open db");
            assert_eq!(catalog.len().expect("len"), 1);
            assert_eq!(
                catalog.get("a").expect("get"),
                Some(record("a", &["urn:a"]))
            );
        }
    }

    #[test]
    fn replace_updates_index() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog.insert(record("a", &["urn:old"])).expect("insert");
        catalog.insert(record("a", &["urn:new"])).expect("insert");

        assert!(catalog.find_by_value("urn:old").expect("find").is_empty());
        assert_eq!(catalog.find_by_value("urn:new").expect("find").len(), 1);
        assert_eq!(catalog.len().expect("len"), 1);
    }

    #[test]
    fn shared_value_ordered_by_id() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog.insert(record("zeta", &["urn:shared"])).expect("insert");
        catalog.insert(record("alpha", &["urn:shared"])).expect("insert");
        catalog.insert(record("mid", &["urn:shared", "urn:mid"])).expect("insert");

        let ids: Vec<_> = catalog
            .find_by_value("urn:shared")
            .expect("find")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn duplicate_values_in_one_record_index_once() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog
            .insert(record("a", &["urn:dup", "urn:dup"]))
            .expect("insert");
        assert_eq!(catalog.find_by_value("urn:dup").expect("find").len(), 1);
    }

    #[test]
    fn remove_clears_index() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog.insert(record("a", &["urn:a"])).expect("insert");
        catalog.insert(record("b", &["urn:a"])).expect("insert");

        let removed = catalog.remove("a").expect("remove");
        assert_eq!(removed.map(|r| r.id), Some("a".to_string()));
        let remaining: Vec<_> = catalog
            .find_by_value("urn:a")
            .expect("find")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(remaining, vec!["b"]);
        assert!(catalog.remove("missing").expect("remove").is_none());
    }

    #[test]
    fn invalid_record_not_stored() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        let result = catalog.insert(CatalogRecord::new("a", "a", InformationModel::r4()));
        assert!(matches!(result, Err(PreferredIdError::InvalidRecord(_))));
        assert_eq!(catalog.len().expect("len"), 0);
    }

    #[test]
    fn records_lists_in_id_order() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");

        catalog.insert(record("b", &["urn:b"])).expect("insert");
        catalog.insert(record("a", &["urn:a"])).expect("insert");

        let ids: Vec<_> = catalog
            .records()
            .expect("records")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn search_uses_value_index() {
        let temp = tempdir().expect("temp dir");
        let mut catalog = RedbCatalog::open(temp.path().join("test.redb")).expect("open db");
        catalog.insert(record("a", &["urn:a"])).expect("insert");

        let found = catalog
            .search(
                &CatalogQuery::naming_system("urn:a"),
                &SearchScope::new(InformationModel::r4()),
            )
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
    }
}
