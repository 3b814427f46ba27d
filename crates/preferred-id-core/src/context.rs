//! # Operation Context
//!
//! The minimal surface the pipeline needs from whatever host dispatches the
//! request: argument lookup, the requester's information model, and places
//! to put the status, payload and issues.
//!
//! `RequestContext` is the request-scoped implementation used by the HTTP
//! host and the CLI.

use crate::outcome::{Issue, OperationOutcome, Parameters};
use crate::types::InformationModel;
use serde::Serialize;
use std::collections::BTreeMap;

/// Host-side view of one operation invocation.
pub trait OperationContext {
    /// Value of a named argument, if supplied.
    fn argument(&self, name: &str) -> Option<&str>;

    /// Information model of the context that issued the request.
    fn information_model(&self) -> &InformationModel;

    fn set_status(&mut self, status: u16);

    fn set_payload(&mut self, payload: Parameters);

    fn add_issue(&mut self, issue: Issue);
}

/// Body of a finished response: the payload on success, otherwise an
/// `OperationOutcome` with the accumulated issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Parameters(Parameters),
    OperationOutcome(OperationOutcome),
}

/// Request-scoped context built from query arguments.
#[derive(Debug, Clone)]
pub struct RequestContext {
    arguments: BTreeMap<String, String>,
    information_model: InformationModel,
    status: Option<u16>,
    payload: Option<Parameters>,
    issues: Vec<Issue>,
}

impl RequestContext {
    #[must_use]
    pub fn new(arguments: BTreeMap<String, String>, information_model: InformationModel) -> Self {
        Self {
            arguments,
            information_model,
            status: None,
            payload: None,
            issues: Vec::new(),
        }
    }

    /// Convenience constructor from `(name, value)` pairs.
    #[must_use]
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        information_model: InformationModel,
    ) -> Self {
        let arguments = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(arguments, information_model)
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Parameters> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Finish the request: final status and body.
    ///
    /// A context whose status was never set answers 500.
    #[must_use]
    pub fn into_reply(self) -> (u16, ResponseBody) {
        let status = self.status.unwrap_or(500);
        let body = match self.payload {
            Some(payload) if self.issues.is_empty() => ResponseBody::Parameters(payload),
            _ => ResponseBody::OperationOutcome(OperationOutcome::new(self.issues)),
        };
        (status, body)
    }
}

impl OperationContext for RequestContext {
    fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    fn information_model(&self) -> &InformationModel {
        &self.information_model
    }

    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_payload(&mut self, payload: Parameters) {
        self.payload = Some(payload);
    }

    fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::IssueType;

    #[test]
    fn arguments_are_looked_up_by_exact_name() {
        let ctx = RequestContext::from_pairs([("id", "urn:a")], InformationModel::r4());
        assert_eq!(ctx.argument("id"), Some("urn:a"));
        assert_eq!(ctx.argument("ID"), None);
        assert_eq!(ctx.argument("type"), None);
    }

    #[test]
    fn unset_status_replies_500() {
        let ctx = RequestContext::from_pairs([], InformationModel::r4());
        let (status, body) = ctx.into_reply();
        assert_eq!(status, 500);
        assert!(matches!(body, ResponseBody::OperationOutcome(_)));
    }

    #[test]
    fn issues_produce_operation_outcome() {
        let mut ctx = RequestContext::from_pairs([], InformationModel::r4());
        ctx.set_status(404);
        ctx.add_issue(Issue::error(IssueType::NotFound, "MSG_LOCAL_FAIL", "missing"));
        let (status, body) = ctx.into_reply();
        assert_eq!(status, 404);
        match body {
            ResponseBody::OperationOutcome(outcome) => {
                assert_eq!(outcome.issue.len(), 1);
                assert_eq!(outcome.issue[0].text(), "missing");
            }
            ResponseBody::Parameters(_) => unreachable!("expected outcome"),
        }
    }
}
