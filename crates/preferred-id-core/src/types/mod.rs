//! # Core Type Definitions
//!
//! This module contains the catalog-side types shared by every component:
//! - Data model tags (`InformationModel`)
//! - Catalog entries (`CatalogRecord`, `UniqueId`, `UniqueIdType`)
//! - Search inputs (`CatalogQuery`, `SearchScope`)
//! - Error types (`PreferredIdError`)
//!
//! ## Ownership
//!
//! Records are owned by the catalog. The resolution pipeline only borrows
//! them; nothing in this crate mutates a record after it was stored.

use crate::primitives::RESOURCE_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// INFORMATION MODEL
// =============================================================================

/// The data/schema model a record or a request belongs to.
///
/// Compared by exact string equality. The well-known FHIR releases have
/// constructors; any other tag is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InformationModel(pub String);

impl InformationModel {
    /// Tag for FHIR STU3.
    pub const FHIR_R3: &'static str = "Fhir3.0";
    /// Tag for FHIR R4.
    pub const FHIR_R4: &'static str = "Fhir4.0";
    /// Tag for FHIR R5.
    pub const FHIR_R5: &'static str = "Fhir5.0";

    /// Create a model tag from any string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn r3() -> Self {
        Self::new(Self::FHIR_R3)
    }

    #[must_use]
    pub fn r4() -> Self {
        Self::new(Self::FHIR_R4)
    }

    #[must_use]
    pub fn r5() -> Self {
        Self::new(Self::FHIR_R5)
    }

    /// Map a `fhirVersion` value (`4.0`, `4.0.1`, `3.0.2`, ...) to a model tag.
    ///
    /// Only major.minor is significant. Returns `None` for versions this
    /// server has no tag for.
    #[must_use]
    pub fn from_fhir_version(version: &str) -> Option<Self> {
        let mut parts = version.trim().split('.');
        let major = parts.next()?;
        let minor = parts.next().unwrap_or("0");
        match (major, minor) {
            ("3", "0") => Some(Self::r3()),
            ("4", "0") => Some(Self::r4()),
            ("5", "0") => Some(Self::r5()),
            _ => None,
        }
    }

    /// The `fhirVersion` mime parameter for this model, if it is a FHIR tag.
    #[must_use]
    pub fn fhir_version(&self) -> Option<&'static str> {
        match self.0.as_str() {
            Self::FHIR_R3 => Some("3.0"),
            Self::FHIR_R4 => Some("4.0"),
            Self::FHIR_R5 => Some("5.0"),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InformationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CATALOG RECORD
// =============================================================================

/// Kind of a unique id stored on a NamingSystem.
///
/// Serialized with the lower-case FHIR codes (`oid`, `uuid`, `uri`, `other`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueIdType {
    Oid,
    Uuid,
    Uri,
    Other,
}

impl UniqueIdType {
    /// Parse a FHIR `uniqueId.type` code. Unknown codes map to `Other`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "oid" => Self::Oid,
            "uuid" => Self::Uuid,
            "uri" => Self::Uri,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Oid => "oid",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::Other => "other",
        }
    }
}

/// One `(kind, value)` identifier pair of a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueId {
    pub kind: UniqueIdType,
    pub value: String,
    /// Whether the publisher flagged this id as preferred.
    pub preferred: Option<bool>,
}

impl UniqueId {
    #[must_use]
    pub fn new(kind: UniqueIdType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            preferred: None,
        }
    }

    #[must_use]
    pub fn uri(value: impl Into<String>) -> Self {
        Self::new(UniqueIdType::Uri, value)
    }

    #[must_use]
    pub fn oid(value: impl Into<String>) -> Self {
        Self::new(UniqueIdType::Oid, value)
    }
}

/// A NamingSystem catalog entry.
///
/// `unique_ids` keeps the publisher's order; the first pair of a given
/// kind is the one resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Logical id of the NamingSystem resource.
    pub id: String,
    pub name: String,
    pub information_model: InformationModel,
    pub unique_ids: Vec<UniqueId>,
}

impl CatalogRecord {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        information_model: InformationModel,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            information_model,
            unique_ids: Vec::new(),
        }
    }

    /// Builder-style append of an identifier pair.
    #[must_use]
    pub fn with_unique_id(mut self, unique_id: UniqueId) -> Self {
        self.unique_ids.push(unique_id);
        self
    }

    /// True if any identifier pair carries exactly `value`.
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.unique_ids.iter().any(|u| u.value == value)
    }

    /// `NamingSystem/<id>` reference used in diagnostics.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}/{}", RESOURCE_NAME, self.id)
    }

    /// Check the record can be stored: non-empty id and at least one
    /// non-empty unique id.
    pub fn validate(&self) -> Result<(), PreferredIdError> {
        if self.id.is_empty() {
            return Err(PreferredIdError::InvalidRecord(
                "record id must not be empty".to_string(),
            ));
        }
        if self.unique_ids.is_empty() {
            return Err(PreferredIdError::InvalidRecord(format!(
                "{} has no unique ids",
                self.reference()
            )));
        }
        if self.unique_ids.iter().any(|u| u.value.is_empty()) {
            return Err(PreferredIdError::InvalidRecord(format!(
                "{} has an empty unique id value",
                self.reference()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// SEARCH INPUTS
// =============================================================================

/// A catalog query: all records of `resource_kind` carrying `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub resource_kind: &'static str,
    pub value: String,
}

impl CatalogQuery {
    /// Query the NamingSystem catalog for a unique id value.
    #[must_use]
    pub fn naming_system(value: impl Into<String>) -> Self {
        Self {
            resource_kind: RESOURCE_NAME,
            value: value.into(),
        }
    }
}

/// Execution scope handed to the search client alongside a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchScope {
    /// Model of the context that issued the request.
    pub information_model: InformationModel,
}

impl SearchScope {
    #[must_use]
    pub fn new(information_model: InformationModel) -> Self {
        Self { information_model }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors of the crate: catalog backends, configuration and server startup.
///
/// The resolution pipeline never surfaces these to callers; a failed search
/// is reclassified as an internal error there.
#[derive(Debug, Error)]
pub enum PreferredIdError {
    /// An I/O or storage error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A record failed validation and was not stored.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A remote catalog answered with an error or could not be reached.
    #[error("Remote catalog error: {0}")]
    RemoteError(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
