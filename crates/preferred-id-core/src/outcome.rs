//! # Outcome Mapping
//!
//! Terminal values of a lookup and their fixed translation into a
//! response: status code, optional `Parameters` payload and optional issue.
//!
//! | Result        | Status | Payload    | Issue                 |
//! |---------------|--------|------------|-----------------------|
//! | Success       | 200    | Parameters | -                     |
//! | Unsupported   | 501    | -          | error / not-supported |
//! | NotFound      | 404    | -          | error / not-found     |
//! | ModelMismatch | 415    | -          | error / processing    |
//! | Internal      | 500    | -          | error / exception     |
//!
//! No other status code is produced by the operation.

use crate::primitives::{
    DETAIL_CODE_SYSTEM, MSG_INTERNAL_ERROR, MSG_LOCAL_FAIL, MSG_PROCESSING_ERROR, OPERATION_NAME,
    OUTPUT_PARAMETER, RESOURCE_NAME,
};
use crate::types::InformationModel;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// RESOLUTION RESULT
// =============================================================================

/// Failure classification of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested identifier kind is not served.
    Unsupported,
    /// No catalog record carries the requested value.
    NotFound,
    /// The record belongs to a different information model than the caller.
    ModelMismatch,
    /// The catalog search failed.
    Internal,
}

/// A failed lookup: its classification plus caller-facing detail text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ResolutionFailure {
    pub fn unsupported() -> Self {
        Self {
            kind: ErrorKind::Unsupported,
            detail: format!("{RESOURCE_NAME} only supports unique id type 'url' or 'oid'"),
        }
    }

    pub fn not_found(value: &str) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            detail: format!("Unable to find {RESOURCE_NAME} with unique id value '{value}'"),
        }
    }

    pub fn model_mismatch(
        reference: &str,
        actual: &InformationModel,
        expected: &InformationModel,
    ) -> Self {
        Self {
            kind: ErrorKind::ModelMismatch,
            detail: format!(
                "Found {reference} in information model {actual}. \
                 Expected information model {expected} instead."
            ),
        }
    }

    /// Generic internal failure. The underlying cause is never part of the
    /// detail text.
    pub fn internal() -> Self {
        Self {
            kind: ErrorKind::Internal,
            detail: format!(
                "Internal server error occurred while executing ${OPERATION_NAME}. \
                 Please see server logs for more details"
            ),
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}

/// Terminal value of the resolution pipeline. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// A record was found. `resolved_value` is `None` when the record has no
    /// identifier of the requested kind.
    Success { resolved_value: Option<String> },
    Failure(ResolutionFailure),
}

impl ResolutionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(f) => Some(f.kind),
        }
    }
}

impl From<ResolutionFailure> for ResolutionResult {
    fn from(failure: ResolutionFailure) -> Self {
        Self::Failure(failure)
    }
}

// =============================================================================
// ISSUES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// Machine-readable issue type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    NotFound,
    NotSupported,
    Processing,
    Exception,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub coding: Vec<Coding>,
    pub text: String,
}

/// A structured diagnostic attached to a failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub code: IssueType,
    pub details: IssueDetails,
}

impl Issue {
    /// Error issue with a detail code from [`DETAIL_CODE_SYSTEM`].
    #[must_use]
    pub fn error(code: IssueType, detail_code: &str, text: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            details: IssueDetails {
                coding: vec![Coding {
                    system: DETAIL_CODE_SYSTEM.to_string(),
                    code: detail_code.to_string(),
                }],
                text: text.into(),
            },
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.details.text
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// One named output parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

/// Success payload: a `Parameters` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub resource_type: String,
    pub parameter: Vec<ParameterComponent>,
}

impl Parameters {
    /// `Parameters` holding the single `name` output.
    #[must_use]
    pub fn preferred_id(value: Option<String>) -> Self {
        Self {
            resource_type: "Parameters".to_string(),
            parameter: vec![ParameterComponent {
                name: OUTPUT_PARAMETER.to_string(),
                value_string: value,
            }],
        }
    }

    /// Value of the named parameter, if present and set.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.parameter
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value_string.as_deref())
    }
}

/// Failure payload: an `OperationOutcome` resource carrying the issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    pub issue: Vec<Issue>,
}

impl OperationOutcome {
    #[must_use]
    pub fn new(issue: Vec<Issue>) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            issue,
        }
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Status, payload and issue produced for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResponse {
    pub status: u16,
    pub payload: Option<Parameters>,
    pub issue: Option<Issue>,
}

/// Map a terminal result to its response according to the fixed table.
#[must_use]
pub fn to_response(result: ResolutionResult) -> OperationResponse {
    match result {
        ResolutionResult::Success { resolved_value } => OperationResponse {
            status: 200,
            payload: Some(Parameters::preferred_id(resolved_value)),
            issue: None,
        },
        ResolutionResult::Failure(failure) => {
            let (status, code, detail_code) = match failure.kind {
                ErrorKind::Unsupported => (501, IssueType::NotSupported, MSG_LOCAL_FAIL),
                ErrorKind::NotFound => (404, IssueType::NotFound, MSG_LOCAL_FAIL),
                ErrorKind::ModelMismatch => (415, IssueType::Processing, MSG_PROCESSING_ERROR),
                ErrorKind::Internal => (500, IssueType::Exception, MSG_INTERNAL_ERROR),
            };
            OperationResponse {
                status,
                payload: None,
                issue: Some(Issue::error(code, detail_code, failure.detail)),
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
