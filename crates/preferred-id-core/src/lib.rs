//! # preferred-id-core
//!
//! Resolution engine for the NamingSystem `$preferred-id` operation - THE LOGIC.
//!
//! Given an identifier value and a kind token (`url` or `oid`), the engine
//! finds the NamingSystem carrying that value and returns its identifier of
//! the requested kind, or a precise failure classification.
//!
//! ## Pipeline
//!
//! ```text
//! classify -> CatalogSearch::search -> resolver -> guard -> outcome
//! ```
//!
//! ## Architectural Constraints
//!
//! - No network code: remote catalogs plug in through `CatalogSearch`
//! - Request-scoped: every lookup is independent, nothing is cached
//! - Exhaustive outcomes: `ResolutionResult` is a sum type and every
//!   failure kind maps to exactly one status code

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod classify;
pub mod conformance;
pub mod context;
pub mod guard;
pub mod outcome;
pub mod pipeline;
pub mod primitives;
pub mod resolver;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    PreferredIdError, CatalogQuery, CatalogRecord, InformationModel, SearchScope, UniqueId,
    UniqueIdType,
};

// =============================================================================
// RE-EXPORTS: Resolution Pipeline
// =============================================================================

pub use catalog::{CatalogSearch, CatalogStore, MemoryCatalog};
pub use classify::{IdentifierKind, classify};
pub use context::{OperationContext, RequestContext, ResponseBody};
pub use outcome::{
    ErrorKind, Issue, IssueSeverity, IssueType, OperationOutcome, OperationResponse, Parameters,
    ResolutionFailure, ResolutionResult, to_response,
};
pub use pipeline::{LookupRequest, PreferredIdService};
pub use storage::RedbCatalog;

// =============================================================================
// RE-EXPORTS: Conformance
// =============================================================================

pub use conformance::{
    CapabilityStatement, PREFERRED_ID_OPERATION, PreferredIdConformance, SupportedOperations,
};
