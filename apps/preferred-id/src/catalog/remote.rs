//! # Remote Catalog
//!
//! `CatalogSearch` over an upstream FHIR server:
//!
//! ```text
//! GET {base}/NamingSystem?value=<v>
//! Accept: application/fhir+json; fhirVersion=<requester's version>
//! ```
//!
//! The searchset Bundle is read in the server's order. Records are tagged
//! with the model named in the response `Content-Type`, falling back to the
//! requester's model when the upstream does not say.

use super::import::records_from_value;
use crate::media::{fhir_json_for, model_from_media_type};
use async_trait::async_trait;
use preferred_id_core::{PreferredIdError, CatalogQuery, CatalogRecord, CatalogSearch, SearchScope};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

/// Upper bound for one upstream search.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Search parameter matching `NamingSystem.uniqueId.value`.
const VALUE_PARAM: &str = "value";

/// HTTP client for an upstream NamingSystem catalog.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteCatalog {
    /// Create a client for the FHIR base at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PreferredIdError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PreferredIdError::ConfigError(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, resource_kind: &str) -> String {
        format!("{}/{}", self.base_url, resource_kind)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, PreferredIdError> {
        req.send()
            .await
            .map_err(|e| PreferredIdError::RemoteError(format!("{}: {e}", self.base_url)))
    }

    async fn handle_response(
        &self,
        resp: reqwest::Response,
        scope: &SearchScope,
    ) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PreferredIdError::RemoteError(format!(
                "{} answered {}: {}",
                self.base_url,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let model = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(model_from_media_type)
            .unwrap_or_else(|| scope.information_model.clone());

        let bundle: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PreferredIdError::DeserializationError(e.to_string()))?;
        records_from_value(bundle, &model)
    }
}

#[async_trait]
impl CatalogSearch for RemoteCatalog {
    async fn search(
        &self,
        query: &CatalogQuery,
        scope: &SearchScope,
    ) -> Result<Vec<CatalogRecord>, PreferredIdError> {
        let req = self
            .http
            .get(self.search_url(query.resource_kind))
            .query(&[(VALUE_PARAM, query.value.as_str())])
            .header(ACCEPT, fhir_json_for(&scope.information_model));

        tracing::debug!(
            base_url = %self.base_url,
            value = %query.value,
            model = %scope.information_model,
            "searching remote catalog"
        );

        let resp = self.send(req).await?;
        self.handle_response(resp, scope).await
    }
}
