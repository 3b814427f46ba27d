//! # NamingSystem JSON
//!
//! Reads FHIR NamingSystem resources into catalog records. Accepted
//! documents:
//! - a single `NamingSystem`
//! - a JSON array of resources
//! - a `Bundle` whose `entry[].resource` holds the resources
//!
//! Resources of any other type are skipped.

use preferred_id_core::{PreferredIdError, CatalogRecord, InformationModel, UniqueId, UniqueIdType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NAMING_SYSTEM: &str = "NamingSystem";
const BUNDLE: &str = "Bundle";

/// `NamingSystem.uniqueId` as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIdJson {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
}

/// The parts of a NamingSystem resource the catalog keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingSystemJson {
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unique_id: Vec<UniqueIdJson>,
}

impl NamingSystemJson {
    /// Convert into a validated record tagged with `model`.
    pub fn into_record(self, model: &InformationModel) -> Result<CatalogRecord, PreferredIdError> {
        let id = self.id.ok_or_else(|| {
            PreferredIdError::InvalidRecord(format!("{NAMING_SYSTEM} without an id"))
        })?;
        let name = self.name.unwrap_or_else(|| id.clone());

        let record = self.unique_id.into_iter().fold(
            CatalogRecord::new(id, name, model.clone()),
            |record, u| {
                record.with_unique_id(UniqueId {
                    kind: UniqueIdType::from_code(&u.kind),
                    value: u.value,
                    preferred: u.preferred,
                })
            },
        );
        record.validate()?;
        Ok(record)
    }
}

impl From<&CatalogRecord> for NamingSystemJson {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            resource_type: NAMING_SYSTEM.to_string(),
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            unique_id: record
                .unique_ids
                .iter()
                .map(|u| UniqueIdJson {
                    kind: u.kind.code().to_string(),
                    value: u.value.clone(),
                    preferred: u.preferred,
                })
                .collect(),
        }
    }
}

/// Parse a document into records tagged with `model`.
pub fn parse_naming_systems(
    bytes: &[u8],
    model: &InformationModel,
) -> Result<Vec<CatalogRecord>, PreferredIdError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| PreferredIdError::DeserializationError(e.to_string()))?;
    records_from_value(document, model)
}

/// Same as [`parse_naming_systems`] for an already parsed document.
pub fn records_from_value(
    document: Value,
    model: &InformationModel,
) -> Result<Vec<CatalogRecord>, PreferredIdError> {
    let resources = match document {
        Value::Array(items) => items,
        Value::Object(object) => {
            if object.get("resourceType").and_then(Value::as_str) == Some(BUNDLE) {
                bundle_resources(object)
            } else {
                vec![Value::Object(object)]
            }
        }
        _ => {
            return Err(PreferredIdError::DeserializationError(
                "expected a JSON object or array".to_string(),
            ));
        }
    };

    let mut records = Vec::with_capacity(resources.len());
    for resource in resources {
        match resource_type(&resource) {
            Some(NAMING_SYSTEM) => {
                let naming_system: NamingSystemJson = serde_json::from_value(resource)
                    .map_err(|e| PreferredIdError::DeserializationError(e.to_string()))?;
                records.push(naming_system.into_record(model)?);
            }
            other => {
                tracing::debug!(
                    resource_type = other.unwrap_or("<none>"),
                    "skipping non-NamingSystem resource"
                );
            }
        }
    }
    Ok(records)
}

fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("resourceType").and_then(Value::as_str)
}

fn bundle_resources(mut bundle: Map<String, Value>) -> Vec<Value> {
    match bundle.remove("entry") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(mut entry) => entry.remove("resource"),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
