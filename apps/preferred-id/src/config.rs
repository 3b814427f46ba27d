//! # Configuration
//!
//! Server and catalog settings, read from an optional TOML file and then
//! overridden from the environment.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 4080
//! information_model = "Fhir4.0"
//! supported_operations = ["preferred-id"]
//! rate_limit = 100
//! cors_origins = ["http://localhost:3000"]
//!
//! [catalog]
//! backend = "remote"
//! base_url = "https://fhir.example.org/r4"
//! ```
//!
//! ## Environment Overrides
//!
//! - `PREFERRED_ID_RATE_LIMIT`: Requests per second (0 disables)
//! - `PREFERRED_ID_CORS_ORIGINS`: Comma-separated origins, or "*" for all
//! - `PREFERRED_ID_REMOTE_URL`: Base URL of the upstream FHIR server

use preferred_id_core::{PreferredIdError, InformationModel, SupportedOperations};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_RATE_LIMIT: &str = "PREFERRED_ID_RATE_LIMIT";
const ENV_CORS_ORIGINS: &str = "PREFERRED_ID_CORS_ORIGINS";
const ENV_REMOTE_URL: &str = "PREFERRED_ID_REMOTE_URL";

// =============================================================================
// SETTINGS
// =============================================================================

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
}

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Model assumed for requests that do not name a `fhirVersion`.
    pub information_model: String,
    pub supported_operations: Vec<String>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins. Empty means localhost only, `["*"]` means any.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4080,
            information_model: InformationModel::FHIR_R4.to_string(),
            supported_operations: vec!["preferred-id".to_string()],
            rate_limit: 100,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    #[must_use]
    pub fn information_model(&self) -> InformationModel {
        InformationModel::new(self.information_model.as_str())
    }

    #[must_use]
    pub fn supported_operations(&self) -> SupportedOperations {
        SupportedOperations::new(self.supported_operations.iter().map(String::as_str))
    }

    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which catalog answers searches.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// In-process catalog, optionally seeded from a JSON file.
    Memory,
    /// redb database file.
    #[default]
    Redb,
    /// Upstream FHIR server.
    Remote,
}

impl std::fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Redb => "redb",
            Self::Remote => "remote",
        };
        f.write_str(name)
    }
}

/// Catalog backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub backend: CatalogBackend,
    /// redb database path.
    pub path: PathBuf,
    /// NamingSystem JSON loaded into the memory backend at startup.
    pub seed: Option<PathBuf>,
    /// Base URL of the upstream FHIR server for the remote backend.
    pub base_url: Option<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Redb,
            path: PathBuf::from("naming-systems.db"),
            seed: None,
            base_url: None,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Settings {
    /// Load settings from `path` (defaults when `None`), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, PreferredIdError> {
        let mut settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    PreferredIdError::ConfigError(format!(
                        "Cannot read config '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, PreferredIdError> {
        toml::from_str(text).map_err(|e| PreferredIdError::ConfigError(e.to_string()))
    }

    fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_RATE_LIMIT).ok().as_deref(),
            std::env::var(ENV_CORS_ORIGINS).ok().as_deref(),
            std::env::var(ENV_REMOTE_URL).ok().as_deref(),
        );
    }

    /// Apply override values as read from the environment.
    ///
    /// An unparsable rate limit is ignored with a warning.
    pub fn apply_overrides(
        &mut self,
        rate_limit: Option<&str>,
        cors_origins: Option<&str>,
        remote_url: Option<&str>,
    ) {
        if let Some(raw) = rate_limit {
            match raw.trim().parse() {
                Ok(rps) => self.server.rate_limit = rps,
                Err(_) => tracing::warn!("{}: ignoring invalid value '{}'", ENV_RATE_LIMIT, raw),
            }
        }
        if let Some(raw) = cors_origins {
            self.server.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(url) = remote_url {
            self.catalog.base_url = Some(url.trim().to_string());
        }
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), PreferredIdError> {
        if self.server.information_model.is_empty() {
            return Err(PreferredIdError::ConfigError(
                "server.information_model must not be empty".to_string(),
            ));
        }
        if self.catalog.backend == CatalogBackend::Remote
            && self.catalog.base_url.as_deref().is_none_or(str::is_empty)
        {
            return Err(PreferredIdError::ConfigError(format!(
                "catalog.base_url (or {}) is required for the remote backend",
                ENV_REMOTE_URL
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let settings = Settings::default();
        assert_eq!(settings.server.addr(), "127.0.0.1:4080");
        assert_eq!(settings.server.information_model(), InformationModel::r4());
        assert!(settings.server.supported_operations().supports("preferred-id"));
        assert_eq!(settings.catalog.backend, CatalogBackend::Redb);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 9090
            information_model = "Fhir3.0"

            [catalog]
            backend = "memory"
            seed = "seed.json"
            "#,
        )
        .expect("parse");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.information_model(), InformationModel::r3());
        assert_eq!(settings.catalog.backend, CatalogBackend::Memory);
        assert_eq!(settings.catalog.seed, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let err = Settings::from_toml("[catalog]\nbackend = \"sqlite\"\n");
        assert!(matches!(err, Err(PreferredIdError::ConfigError(_))));
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = Settings::load(Some(&temp.path().join("missing.toml"))).expect_err("load");
        assert!(matches!(err, PreferredIdError::ConfigError(_)));
        assert!(err.to_string().starts_with("Configuration error: Cannot read config"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut settings = Settings::default();
        settings.apply_overrides(
            Some("0"),
            Some("http://a.example, http://b.example,"),
            Some(" https://fhir.example.org/r4 "),
        );
        assert_eq!(settings.server.rate_limit, 0);
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://a.example", "http://b.example"]
        );
        assert_eq!(
            settings.catalog.base_url.as_deref(),
            Some("https://fhir.example.org/r4")
        );
    }

    #[test]
    fn invalid_rate_limit_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(Some("fast"), None, None);
        assert_eq!(settings.server.rate_limit, 100);
    }

    #[test]
    fn remote_backend_requires_base_url() {
        let mut settings = Settings::default();
        settings.catalog.backend = CatalogBackend::Remote;
        assert!(settings.validate().is_err());
        settings.catalog.base_url = Some("https://fhir.example.org".to_string());
        assert!(settings.validate().is_ok());
    }
}
