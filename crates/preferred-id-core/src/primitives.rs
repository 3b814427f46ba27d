//! # Operation Primitives
//!
//! Fixed names and codes for the `$preferred-id` operation.
//!
//! These values are part of the wire contract with callers and are
//! compiled in; none of them is configurable at runtime.

/// Resource kind the operation is bound to, and the only kind searched.
pub const RESOURCE_NAME: &str = "NamingSystem";

/// Operation name as it appears in the URL (`$preferred-id`) and in the
/// capability statement.
pub const OPERATION_NAME: &str = "preferred-id";

/// Canonical OperationDefinition the operation implements.
pub const OPERATION_DEFINITION_URL: &str =
    "http://hl7.org/fhir/OperationDefinition/NamingSystem-preferred-id";

/// Query argument carrying the identifier value to resolve.
pub const ARG_ID: &str = "id";

/// Query argument carrying the identifier kind token (`url` or `oid`).
pub const ARG_TYPE: &str = "type";

/// Name of the single output parameter on success.
pub const OUTPUT_PARAMETER: &str = "name";

// =============================================================================
// ISSUE CODES
// =============================================================================

/// Code system every issue detail code is drawn from.
pub const DETAIL_CODE_SYSTEM: &str =
    "http://vonk.fire.ly/fhir/ValueSet/OperationOutcomeIssueDetails";

/// Detail code for expected, user-facing failures.
pub const MSG_LOCAL_FAIL: &str = "MSG_LOCAL_FAIL";

/// Detail code for a record that cannot be processed for the requester,
/// such as one held in another information model.
pub const MSG_PROCESSING_ERROR: &str = "MSG_PROCESSING_ERROR";

/// Detail code for internal errors.
pub const MSG_INTERNAL_ERROR: &str = "5000";
