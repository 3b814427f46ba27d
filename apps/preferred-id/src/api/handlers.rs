//! # API Endpoint Handlers

use super::{
    AppState,
    types::{FhirResponse, HealthResponse},
};
use crate::media::model_from_media_type;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use preferred_id_core::{InformationModel, RequestContext};
use std::collections::BTreeMap;

/// Information model of a request: the `fhirVersion` parameter of its
/// `Accept` header, else `default`.
#[must_use]
pub fn negotiate_model(headers: &HeaderMap, default: &InformationModel) -> InformationModel {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(model_from_media_type)
        .unwrap_or_else(|| default.clone())
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// METADATA HANDLER
// =============================================================================

/// CapabilityStatement for the requester's information model.
pub async fn metadata_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let model = negotiate_model(&headers, &state.default_model);
    let statement = state.conformance.capability_statement(model);
    FhirResponse::new(200, &statement)
}

// =============================================================================
// $PREFERRED-ID HANDLER
// =============================================================================

/// `GET /NamingSystem/$preferred-id?id=<value>&type=<url|oid>`
pub async fn preferred_id_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(arguments): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let model = negotiate_model(&headers, &state.default_model);
    let mut ctx = RequestContext::new(arguments, model);

    state.service.preferred_id_get(&mut ctx).await;

    let (status, body) = ctx.into_reply();
    FhirResponse::new(status, &body)
}
