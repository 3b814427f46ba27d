//! # Identifier Kind Classification
//!
//! Maps the free-text `type` argument to the identifier kind the
//! operation serves.
//!
//! - Exactly two tokens are recognized, case-insensitively: `url` and `oid`
//! - Everything else, including an empty or absent token, is `Unsupported`
//! - `Unsupported` is a valid classification, not an error; the pipeline
//!   turns it into a rejection without searching

use crate::types::UniqueIdType;
use std::fmt;

/// Identifier kind requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Uri,
    Oid,
    Unsupported,
}

impl IdentifierKind {
    /// Whether a stored unique id of type `stored` satisfies this kind.
    #[must_use]
    pub const fn matches(self, stored: UniqueIdType) -> bool {
        matches!(
            (self, stored),
            (Self::Uri, UniqueIdType::Uri) | (Self::Oid, UniqueIdType::Oid)
        )
    }

    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uri => "uri",
            Self::Oid => "oid",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Classify a `type` token.
///
/// Pure and total.
#[must_use]
pub fn classify(token: Option<&str>) -> IdentifierKind {
    match token {
        Some(t) if t.eq_ignore_ascii_case("url") => IdentifierKind::Uri,
        Some(t) if t.eq_ignore_ascii_case("oid") => IdentifierKind::Oid,
        _ => IdentifierKind::Unsupported,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_url_any_case() {
        assert_eq!(classify(Some("url")), IdentifierKind::Uri);
        assert_eq!(classify(Some("URL")), IdentifierKind::Uri);
        assert_eq!(classify(Some("Url")), IdentifierKind::Uri);
    }

    #[test]
    fn recognizes_oid_any_case() {
        assert_eq!(classify(Some("oid")), IdentifierKind::Oid);
        assert_eq!(classify(Some("OID")), IdentifierKind::Oid);
    }

    #[test]
    fn everything_else_is_unsupported() {
        for token in ["ftp", "uri", "uuid", "", " url", "url ", "other"] {
            assert_eq!(
                classify(Some(token)),
                IdentifierKind::Unsupported,
                "token {token:?}"
            );
        }
        assert_eq!(classify(None), IdentifierKind::Unsupported);
    }

    #[test]
    fn kind_matches_stored_type() {
        assert!(IdentifierKind::Uri.matches(UniqueIdType::Uri));
        assert!(IdentifierKind::Oid.matches(UniqueIdType::Oid));
        assert!(!IdentifierKind::Uri.matches(UniqueIdType::Oid));
        assert!(!IdentifierKind::Oid.matches(UniqueIdType::Uuid));
        assert!(!IdentifierKind::Unsupported.matches(UniqueIdType::Other));
        assert!(!IdentifierKind::Unsupported.is_supported());
    }
}
