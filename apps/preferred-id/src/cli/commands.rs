//! # CLI Command Implementations

use crate::api;
use crate::catalog::{load_naming_systems, open_catalog, open_store};
use crate::config::{CatalogBackend, Settings};
use preferred_id_core::{
    PreferredIdError, CatalogStore, InformationModel, PreferredIdService, RedbCatalog,
    RequestContext, ResponseBody,
};
use std::path::Path;

/// Parse a `--model` value: a model tag (`Fhir4.0`) or a FHIR version
/// (`4.0`, `4.0.1`).
#[must_use]
pub fn parse_model(value: &str) -> InformationModel {
    InformationModel::from_fhir_version(value).unwrap_or_else(|| InformationModel::new(value))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), PreferredIdError> {
    let server = &settings.server;
    let catalog = open_catalog(&settings.catalog, &server.information_model())?;

    println!("$preferred-id Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:    {}", server.host);
    println!("  Port:    {}", server.port);
    println!("  Model:   {}", server.information_model);
    println!("  Backend: {}", settings.catalog.backend);
    match settings.catalog.backend {
        CatalogBackend::Redb => println!("  Catalog: {:?}", settings.catalog.path),
        CatalogBackend::Memory => println!("  Seed:    {:?}", settings.catalog.seed),
        CatalogBackend::Remote => println!(
            "  Remote:  {}",
            settings.catalog.base_url.as_deref().unwrap_or_default()
        ),
    }
    println!();
    println!("Endpoints:");
    println!("  GET {} - Resolve a preferred id", api::preferred_id_path());
    println!("  GET /metadata - CapabilityStatement");
    println!("  GET /health   - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(settings, catalog).await
}

// =============================================================================
// LOOKUP COMMAND
// =============================================================================

/// Run one lookup and print the resulting resource.
pub async fn cmd_lookup(
    settings: &Settings,
    json_mode: bool,
    id: Option<&str>,
    kind: Option<&str>,
    model: Option<&str>,
) -> Result<(), PreferredIdError> {
    let model = model.map_or_else(|| settings.server.information_model(), parse_model);
    let catalog = open_catalog(&settings.catalog, &settings.server.information_model())?;
    let service = PreferredIdService::new(catalog);

    let arguments = [("id", id), ("type", kind)]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)));
    let mut ctx = RequestContext::from_pairs(arguments, model);
    service.preferred_id_get(&mut ctx).await;
    let (status, body) = ctx.into_reply();

    if json_mode {
        let body = serde_json::to_value(&body)
            .map_err(|e| PreferredIdError::SerializationError(e.to_string()))?;
        print_json(&serde_json::json!({
            "status": status,
            "body": body,
        }));
        return Ok(());
    }

    println!("Status: {}", status);
    match body {
        ResponseBody::Parameters(parameters) => {
            let value = parameters.value_of(preferred_id_core::primitives::OUTPUT_PARAMETER);
            println!("Preferred id: {}", value.unwrap_or("(none of the requested type)"));
        }
        ResponseBody::OperationOutcome(outcome) => {
            for issue in &outcome.issue {
                println!("Error: {}", issue.text());
            }
        }
    }
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import NamingSystem JSON into the redb catalog.
pub fn cmd_import(
    settings: &Settings,
    json_mode: bool,
    file: &Path,
    model: Option<&str>,
) -> Result<(), PreferredIdError> {
    let model = model.map_or_else(|| settings.server.information_model(), parse_model);
    let records = load_naming_systems(file, &model)?;
    let mut store = open_store(&settings.catalog)?;

    let count = store.insert_all(records)?;
    let total = store.len()?;
    tracing::info!("Imported {} NamingSystems from {:?}", count, file);

    if json_mode {
        print_json(&serde_json::json!({
            "file": file.to_string_lossy(),
            "information_model": model.as_str(),
            "imported": count,
            "total": total,
        }));
        return Ok(());
    }

    println!("Imported {} NamingSystems ({}) from {:?}", count, model, file);
    println!("Catalog now holds {} records", total);
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty redb catalog.
pub fn cmd_init(settings: &Settings, json_mode: bool, force: bool) -> Result<(), PreferredIdError> {
    if settings.catalog.backend != CatalogBackend::Redb {
        return Err(PreferredIdError::ConfigError(format!(
            "init only applies to the redb backend, not {}",
            settings.catalog.backend
        )));
    }

    let path = &settings.catalog.path;
    if path.exists() {
        if !force {
            return Err(PreferredIdError::IoError(format!(
                "Database {:?} already exists. Use --force to replace it.",
                path
            )));
        }
        std::fs::remove_file(path)
            .map_err(|e| PreferredIdError::IoError(format!("Cannot remove {:?}: {}", path, e)))?;
    }

    RedbCatalog::open(path)?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": path.to_string_lossy(),
            "initialized": true,
        }));
    } else {
        println!("Initialized empty catalog at {:?}", path);
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show catalog status.
pub fn cmd_status(settings: &Settings, json_mode: bool) -> Result<(), PreferredIdError> {
    let catalog = &settings.catalog;
    let records = match catalog.backend {
        CatalogBackend::Redb => Some(open_store(catalog)?.len()?),
        CatalogBackend::Memory => match &catalog.seed {
            Some(seed) => Some(load_naming_systems(seed, &settings.server.information_model())?.len()),
            None => Some(0),
        },
        CatalogBackend::Remote => None,
    };

    if json_mode {
        print_json(&serde_json::json!({
            "backend": catalog.backend.to_string(),
            "database": catalog.path.to_string_lossy(),
            "remote": catalog.base_url,
            "information_model": settings.server.information_model,
            "supported_operations": settings.server.supported_operations,
            "records": records,
        }));
        return Ok(());
    }

    println!("$preferred-id Catalog Status");
    println!("============================");
    println!("Backend: {}", catalog.backend);
    match catalog.backend {
        CatalogBackend::Redb => println!("Database: {:?}", catalog.path),
        CatalogBackend::Memory => println!("Seed:     {:?}", catalog.seed),
        CatalogBackend::Remote => println!(
            "Remote:   {}",
            catalog.base_url.as_deref().unwrap_or_default()
        ),
    }
    println!("Model:   {}", settings.server.information_model);
    println!(
        "Operations: {}",
        settings.server.supported_operations.join(", ")
    );
    match records {
        Some(n) => println!("Records: {}", n),
        None => println!("Records: (held by the remote server)"),
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn redb_settings(dir: &tempfile::TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.catalog.path = dir.path().join("catalog.db");
        settings
    }

    #[test]
    fn parse_model_accepts_tags_and_versions() {
        assert_eq!(parse_model("4.0.1"), InformationModel::r4());
        assert_eq!(parse_model("3.0"), InformationModel::r3());
        assert_eq!(parse_model("Fhir3.0"), InformationModel::r3());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = redb_settings(&dir);

        cmd_init(&settings, true, false).expect("first init");
        assert!(cmd_init(&settings, true, false).is_err());
        cmd_init(&settings, true, true).expect("forced init");
    }

    #[test]
    fn import_then_status() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = redb_settings(&dir);

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(
            br#"{"resourceType":"NamingSystem","id":"gender","name":"AdministrativeGender",
                "uniqueId":[{"type":"uri","value":"http://hl7.org/fhir/administrative-gender"}]}"#,
        )
        .expect("write");

        cmd_import(&settings, true, file.path(), Some("3.0")).expect("import");

        let store = open_store(&settings.catalog).expect("store");
        let record = store.get("gender").expect("get").expect("record");
        assert_eq!(record.information_model, InformationModel::r3());
        drop(store);

        cmd_status(&settings, true).expect("status");
    }

    #[test]
    fn import_into_memory_backend_fails() {
        let mut settings = Settings::default();
        settings.catalog.backend = CatalogBackend::Memory;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[]").expect("write");
        assert!(matches!(
            cmd_import(&settings, true, file.path(), None),
            Err(PreferredIdError::ConfigError(_))
        ));
    }
}
