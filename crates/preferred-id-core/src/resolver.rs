//! # Result Resolution
//!
//! Picks the stored identifier of the requested kind out of a search outcome.
//!
//! - Only the first record is considered; the search client's order is
//!   authoritative and never re-sorted here
//! - An empty outcome is `NotFound`
//! - A record without an identifier of the requested kind still resolves,
//!   with an absent value

use crate::classify::IdentifierKind;
use crate::outcome::ResolutionFailure;
use crate::types::CatalogRecord;

/// A record selected from a search outcome, with the value it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub record: &'a CatalogRecord,
    pub value: Option<String>,
}

/// Resolve `kind` against a search outcome for `requested_value`.
pub fn resolve<'a>(
    outcome: &'a [CatalogRecord],
    kind: IdentifierKind,
    requested_value: &str,
) -> Result<Resolved<'a>, ResolutionFailure> {
    let Some(record) = outcome.first() else {
        return Err(ResolutionFailure::not_found(requested_value));
    };

    let value = record
        .unique_ids
        .iter()
        .find(|u| kind.matches(u.kind))
        .map(|u| u.value.clone());

    Ok(Resolved { record, value })
}

// =============================================================================
// TESTS
// =============================================================================
