//! # Resolution Pipeline
//!
//! `$preferred-id` orchestration. Each request walks the stages once, in
//! order, and ends in exactly one `ResolutionResult`:
//!
//! ```text
//! Received -> Classified -+-> Rejected (Unsupported)
//!                         +-> Searching -+-> SearchError (Internal)
//!                                        +-> NotFound
//!                                        +-> Found -+-> ModelMismatch
//!                                                   +-> Resolved (Success)
//! ```
//!
//! The catalog search is the only suspension point. Unsupported kinds never
//! reach it, and neither do empty identifier values.

use crate::catalog::CatalogSearch;
use crate::classify::{IdentifierKind, classify};
use crate::context::OperationContext;
use crate::outcome::{ResolutionFailure, ResolutionResult, to_response};
use crate::primitives::{ARG_ID, ARG_TYPE};
use crate::types::{CatalogQuery, InformationModel, SearchScope};
use crate::{guard, resolver};
use std::sync::Arc;

/// Arguments of one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub identifier_value: String,
    pub kind_token: Option<String>,
}

impl LookupRequest {
    #[must_use]
    pub fn new(identifier_value: impl Into<String>, kind_token: Option<&str>) -> Self {
        Self {
            identifier_value: identifier_value.into(),
            kind_token: kind_token.map(str::to_string),
        }
    }

    /// Read `id` and `type` from a context. A missing `id` becomes an empty
    /// value, which the pipeline answers as not found.
    #[must_use]
    pub fn from_context(ctx: &impl OperationContext) -> Self {
        Self::new(ctx.argument(ARG_ID).unwrap_or_default(), ctx.argument(ARG_TYPE))
    }
}

/// The `$preferred-id` service.
#[derive(Clone)]
pub struct PreferredIdService {
    catalog: Arc<dyn CatalogSearch>,
}

impl std::fmt::Debug for PreferredIdService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferredIdService").finish_non_exhaustive()
    }
}

impl PreferredIdService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSearch>) -> Self {
        Self { catalog }
    }

    /// Run the operation against a host context: read the arguments,
    /// resolve, and write status, payload and issue back.
    pub async fn preferred_id_get(&self, ctx: &mut impl OperationContext) {
        let request = LookupRequest::from_context(&*ctx);
        let model = ctx.information_model().clone();

        let response = to_response(self.resolve(&request, &model).await);

        ctx.set_status(response.status);
        if let Some(payload) = response.payload {
            ctx.set_payload(payload);
        }
        if let Some(issue) = response.issue {
            ctx.add_issue(issue);
        }
    }

    /// Resolve one request for a requester in `model`.
    pub async fn resolve(
        &self,
        request: &LookupRequest,
        model: &InformationModel,
    ) -> ResolutionResult {
        let kind = classify(request.kind_token.as_deref());
        if kind == IdentifierKind::Unsupported {
            let failure = ResolutionFailure::unsupported();
            tracing::debug!(
                kind_token = request.kind_token.as_deref().unwrap_or(""),
                "{}",
                failure.detail
            );
            return failure.into();
        }

        let value = request.identifier_value.as_str();
        if value.is_empty() {
            let failure = ResolutionFailure::not_found(value);
            tracing::debug!("identifier value is empty, not searching");
            return failure.into();
        }

        let query = CatalogQuery::naming_system(value);
        let scope = SearchScope::new(model.clone());
        let outcome = match self.catalog.search(&query, &scope).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("Catalog search failed while executing $preferred-id: {}", e);
                return ResolutionFailure::internal().into();
            }
        };

        let resolved = match resolver::resolve(&outcome, kind, value) {
            Ok(resolved) => resolved,
            Err(failure) => {
                tracing::debug!("{}", failure.detail);
                return failure.into();
            }
        };

        if let Err(failure) = guard::check(resolved.record, model) {
            tracing::debug!("{}", failure.detail);
            return failure.into();
        }

        ResolutionResult::Success {
            resolved_value: resolved.value,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::context::{RequestContext, ResponseBody};
    use crate::outcome::ErrorKind;
    use crate::types::{CatalogRecord, UniqueId};

    const GENDER_URI: &str = "http://hl7.org/fhir/administrative-gender";

    fn service() -> PreferredIdService {
        let record = CatalogRecord::new("gender", "AdministrativeGender", InformationModel::r4())
            .with_unique_id(UniqueId::uri(GENDER_URI));
        let catalog = MemoryCatalog::from_records(vec![record]).expect("catalog");
        PreferredIdService::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn resolves_uri() {
        let result = service()
            .resolve(
                &LookupRequest::new(GENDER_URI, Some("url")),
                &InformationModel::r4(),
            )
            .await;
        assert_eq!(
            result,
            ResolutionResult::Success {
                resolved_value: Some(GENDER_URI.to_string())
            }
        );
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let result = service()
            .resolve(&LookupRequest::new("", Some("url")), &InformationModel::r4())
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn long_stored_values_resolve() {
        for len in [4096, 5000, 70_000] {
            let long = format!("http://example.org/{}", "a".repeat(len));
            let record = CatalogRecord::new("long", "Long", InformationModel::r4())
                .with_unique_id(UniqueId::uri(&long));
            let catalog = MemoryCatalog::from_records(vec![record]).expect("catalog");
            let service = PreferredIdService::new(Arc::new(catalog));

            let result = service
                .resolve(
                    &LookupRequest::new(long.as_str(), Some("url")),
                    &InformationModel::r4(),
                )
                .await;
            assert!(result.is_success(), "length {len}");
            assert_eq!(
                result,
                ResolutionResult::Success {
                    resolved_value: Some(long)
                }
            );
        }
    }

    #[tokio::test]
    async fn unsupported_takes_precedence_over_missing_id() {
        let result = service()
            .resolve(&LookupRequest::new("", None), &InformationModel::r4())
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::Unsupported));
    }

    #[tokio::test]
    async fn preferred_id_get_writes_context() {
        let mut ctx = RequestContext::from_pairs(
            [("id", GENDER_URI), ("type", "URL")],
            InformationModel::r4(),
        );
        service().preferred_id_get(&mut ctx).await;

        assert_eq!(ctx.status(), Some(200));
        assert!(ctx.issues().is_empty());
        let (_, body) = ctx.into_reply();
        match body {
            ResponseBody::Parameters(p) => assert_eq!(p.value_of("name"), Some(GENDER_URI)),
            ResponseBody::OperationOutcome(_) => unreachable!("expected parameters"),
        }
    }

    #[tokio::test]
    async fn preferred_id_get_model_mismatch() {
        let mut ctx = RequestContext::from_pairs(
            [("id", GENDER_URI), ("type", "url")],
            InformationModel::r3(),
        );
        service().preferred_id_get(&mut ctx).await;

        assert_eq!(ctx.status(), Some(415));
        assert!(ctx.payload().is_none());
        assert_eq!(ctx.issues().len(), 1);
    }
}
