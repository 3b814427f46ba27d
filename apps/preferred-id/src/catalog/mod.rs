//! # Catalog Wiring
//!
//! Opens the configured catalog backend and loads NamingSystem JSON from
//! disk.
//!
//! | Backend | Source                       | Writable from CLI |
//! |---------|------------------------------|-------------------|
//! | memory  | optional seed file           | no                |
//! | redb    | `catalog.path`               | yes               |
//! | remote  | upstream FHIR server         | no                |

mod import;
mod remote;

pub use import::{NamingSystemJson, UniqueIdJson, parse_naming_systems, records_from_value};
pub use remote::RemoteCatalog;

use crate::config::{CatalogBackend, CatalogSettings};
use preferred_id_core::{
    PreferredIdError, CatalogRecord, CatalogSearch, CatalogStore, InformationModel, MemoryCatalog,
    RedbCatalog,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum size of a NamingSystem JSON file (100 MB).
pub const MAX_IMPORT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Canonicalize `path` and check it names a regular file.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, PreferredIdError> {
    let canonical = path.canonicalize().map_err(|e| {
        PreferredIdError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PreferredIdError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Reject files larger than `max_size` before reading them.
pub fn validate_file_size(path: &Path, max_size: u64) -> Result<(), PreferredIdError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| PreferredIdError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(PreferredIdError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Read NamingSystem JSON from `path` into records tagged with `model`.
pub fn load_naming_systems(
    path: &Path,
    model: &InformationModel,
) -> Result<Vec<CatalogRecord>, PreferredIdError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_IMPORT_FILE_SIZE)?;

    let bytes = std::fs::read(&path)
        .map_err(|e| PreferredIdError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;
    parse_naming_systems(&bytes, model)
}

// =============================================================================
// BACKENDS
// =============================================================================

/// Open the search side of the configured backend.
///
/// Memory catalogs are seeded with `default_model` records.
pub fn open_catalog(
    settings: &CatalogSettings,
    default_model: &InformationModel,
) -> Result<Arc<dyn CatalogSearch>, PreferredIdError> {
    match settings.backend {
        CatalogBackend::Memory => {
            let mut catalog = MemoryCatalog::new();
            if let Some(seed) = &settings.seed {
                let count = catalog.insert_all(load_naming_systems(seed, default_model)?)?;
                tracing::info!("Seeded memory catalog with {} NamingSystems", count);
            }
            Ok(Arc::new(catalog))
        }
        CatalogBackend::Redb => Ok(Arc::new(RedbCatalog::open(&settings.path)?)),
        CatalogBackend::Remote => {
            let base_url = settings.base_url.as_deref().ok_or_else(|| {
                PreferredIdError::ConfigError("catalog.base_url is not set".to_string())
            })?;
            Ok(Arc::new(RemoteCatalog::new(base_url)?))
        }
    }
}

/// Open the configured backend for maintenance. Only redb is writable.
pub fn open_store(settings: &CatalogSettings) -> Result<RedbCatalog, PreferredIdError> {
    match settings.backend {
        CatalogBackend::Redb => RedbCatalog::open(&settings.path),
        other => Err(PreferredIdError::ConfigError(format!(
            "the {} backend cannot be modified, use --backend redb",
            other
        ))),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use preferred_id_core::{CatalogQuery, SearchScope};
    use std::io::Write;

    const SEED: &str = r#"[{
        "resourceType": "NamingSystem",
        "id": "gender",
        "name": "AdministrativeGender",
        "uniqueId": [{"type": "uri", "value": "http://hl7.org/fhir/administrative-gender"}]
    }]"#;

    #[tokio::test]
    async fn memory_backend_is_seeded() {
        let mut seed = tempfile::NamedTempFile::new().expect("temp file");
        seed.write_all(SEED.as_bytes()).expect("write");

        let settings = CatalogSettings {
            backend: CatalogBackend::Memory,
            seed: Some(seed.path().to_path_buf()),
            ..CatalogSettings::default()
        };
        let catalog = open_catalog(&settings, &InformationModel::r4()).expect("open");
        let found = catalog
            .search(
                &CatalogQuery::naming_system("http://hl7.org/fhir/administrative-gender"),
                &SearchScope::new(InformationModel::r4()),
            )
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "gender");
    }

    #[test]
    fn missing_seed_file_fails() {
        let settings = CatalogSettings {
            backend: CatalogBackend::Memory,
            seed: Some(PathBuf::from("/definitely/not/here.json")),
            ..CatalogSettings::default()
        };
        assert!(matches!(
            open_catalog(&settings, &InformationModel::r4()),
            Err(PreferredIdError::IoError(_))
        ));
    }

    #[test]
    fn directories_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(validate_file_path(dir.path()).is_err());
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"0123456789").expect("write");
        assert!(validate_file_size(file.path(), 5).is_err());
        assert!(validate_file_size(file.path(), 10).is_ok());
    }

    #[test]
    fn only_redb_is_writable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = CatalogSettings {
            path: dir.path().join("catalog.db"),
            ..CatalogSettings::default()
        };
        assert!(open_store(&settings).is_ok());

        let memory = CatalogSettings {
            backend: CatalogBackend::Memory,
            ..CatalogSettings::default()
        };
        assert!(matches!(
            open_store(&memory),
            Err(PreferredIdError::ConfigError(_))
        ));
    }
}
