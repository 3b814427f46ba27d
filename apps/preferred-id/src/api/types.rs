//! # API Response Types
//!
//! JSON structures of the HTTP surface that are not FHIR resources, plus
//! the FHIR JSON response wrapper.

use crate::media::FHIR_JSON;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// FHIR RESPONSE
// =============================================================================

/// A serialized FHIR resource with its status, sent as
/// `application/fhir+json`.
#[derive(Debug, Clone)]
pub struct FhirResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl FhirResponse {
    /// Serialize `resource`. Serialization failures become a bare 500.
    pub fn new<T: Serialize>(status: u16, resource: &T) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_vec(resource) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!("Failed to serialize FHIR response: {}", e);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: Vec::new(),
                }
            }
        }
    }
}

impl IntoResponse for FhirResponse {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, FHIR_JSON)], self.body).into_response()
    }
}
