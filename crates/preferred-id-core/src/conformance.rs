//! # Conformance
//!
//! Static description of the `$preferred-id` operation and its
//! contribution to the server's CapabilityStatement.
//!
//! The operation is advertised only when it is enabled in the server's
//! supported operations and the statement is built for an information
//! model the operation serves (FHIR STU3 or R4).

use crate::primitives::{OPERATION_DEFINITION_URL, OPERATION_NAME, RESOURCE_NAME};
use crate::types::InformationModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where an operation is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionLevel {
    System,
    Type,
    Instance,
}

/// Registration data a host needs to route and advertise an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub definition: &'static str,
    pub level: InteractionLevel,
    pub resource_types: &'static [&'static str],
    pub method: &'static str,
    pub information_models: &'static [&'static str],
}

impl OperationDescriptor {
    /// URL path segment, e.g. `$preferred-id`.
    #[must_use]
    pub fn path_segment(&self) -> String {
        format!("${}", self.name)
    }

    #[must_use]
    pub fn serves_model(&self, model: &InformationModel) -> bool {
        self.information_models
            .iter()
            .any(|m| *m == model.as_str())
    }
}

/// The `$preferred-id` operation: type-level, GET, on NamingSystem.
pub const PREFERRED_ID_OPERATION: OperationDescriptor = OperationDescriptor {
    name: OPERATION_NAME,
    definition: OPERATION_DEFINITION_URL,
    level: InteractionLevel::Type,
    resource_types: &[RESOURCE_NAME],
    method: "GET",
    information_models: &[InformationModel::FHIR_R3, InformationModel::FHIR_R4],
};

/// Custom operations enabled on this server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedOperations {
    operations: BTreeSet<String>,
}

impl SupportedOperations {
    #[must_use]
    pub fn new<I, S>(operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operations: operations.into_iter().map(Into::into).collect(),
        }
    }

    /// Accepts the name with or without the leading `$`.
    #[must_use]
    pub fn supports(&self, name: &str) -> bool {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.operations.contains(name) || self.operations.contains(&format!("${name}"))
    }
}

// =============================================================================
// CAPABILITY STATEMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReference {
    pub name: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestComponent {
    pub mode: String,
    #[serde(default)]
    pub operation: Vec<OperationReference>,
}

/// Minimal CapabilityStatement: only the parts this server contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,
    pub status: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,
    pub rest: Vec<RestComponent>,
}

impl CapabilityStatement {
    /// Operations listed on the server rest component.
    #[must_use]
    pub fn operations(&self) -> Vec<&OperationReference> {
        self.rest.iter().flat_map(|r| r.operation.iter()).collect()
    }
}

/// Collects contributions and builds the statement.
#[derive(Debug, Clone)]
pub struct CapabilityStatementBuilder {
    model: InformationModel,
    operations: Vec<OperationReference>,
}

impl CapabilityStatementBuilder {
    #[must_use]
    pub fn new(model: InformationModel) -> Self {
        Self {
            model,
            operations: Vec::new(),
        }
    }

    #[must_use]
    pub fn information_model(&self) -> &InformationModel {
        &self.model
    }

    pub fn add_operation(&mut self, name: &str, definition: &str) {
        self.operations.push(OperationReference {
            name: name.to_string(),
            definition: definition.to_string(),
        });
    }

    #[must_use]
    pub fn build(self) -> CapabilityStatement {
        CapabilityStatement {
            resource_type: "CapabilityStatement".to_string(),
            status: "active".to_string(),
            kind: "instance".to_string(),
            fhir_version: self.model.fhir_version().map(str::to_string),
            rest: vec![RestComponent {
                mode: "server".to_string(),
                operation: self.operations,
            }],
        }
    }
}

/// Adds `$preferred-id` to a CapabilityStatement when enabled.
#[derive(Debug, Clone)]
pub struct PreferredIdConformance {
    supported: SupportedOperations,
}

impl PreferredIdConformance {
    #[must_use]
    pub fn new(supported: SupportedOperations) -> Self {
        Self { supported }
    }

    pub fn contribute(&self, builder: &mut CapabilityStatementBuilder) {
        let op = &PREFERRED_ID_OPERATION;
        if !op.serves_model(builder.information_model()) {
            return;
        }
        if self.supported.supports(op.name) {
            builder.add_operation(op.name, op.definition);
        }
    }

    /// Build the statement for `model` with this contribution applied.
    #[must_use]
    pub fn capability_statement(&self, model: InformationModel) -> CapabilityStatement {
        let mut builder = CapabilityStatementBuilder::new(model);
        self.contribute(&mut builder);
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> PreferredIdConformance {
        PreferredIdConformance::new(SupportedOperations::new(["preferred-id"]))
    }

    #[test]
    fn descriptor_fields() {
        assert_eq!(PREFERRED_ID_OPERATION.path_segment(), "$preferred-id");
        assert_eq!(PREFERRED_ID_OPERATION.resource_types, &["NamingSystem"]);
        assert_eq!(PREFERRED_ID_OPERATION.level, InteractionLevel::Type);
        assert_eq!(PREFERRED_ID_OPERATION.method, "GET");
        assert!(PREFERRED_ID_OPERATION.serves_model(&InformationModel::r3()));
        assert!(!PREFERRED_ID_OPERATION.serves_model(&InformationModel::r5()));
    }

    #[test]
    fn supported_accepts_dollar_prefix() {
        let supported = SupportedOperations::new(["$preferred-id"]);
        assert!(supported.supports("preferred-id"));
        assert!(supported.supports("$preferred-id"));
        assert!(!SupportedOperations::default().supports("preferred-id"));
    }

    #[test]
    fn listed_when_enabled_for_r4() {
        let statement = enabled().capability_statement(InformationModel::r4());
        let ops = statement.operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "preferred-id");
        assert_eq!(ops[0].definition, OPERATION_DEFINITION_URL);
        assert_eq!(statement.fhir_version.as_deref(), Some("4.0"));
    }

    #[test]
    fn not_listed_when_disabled() {
        let conformance = PreferredIdConformance::new(SupportedOperations::new(["validate"]));
        let statement = conformance.capability_statement(InformationModel::r4());
        assert!(statement.operations().is_empty());
    }

    #[test]
    fn not_listed_for_unserved_model() {
        let statement = enabled().capability_statement(InformationModel::r5());
        assert!(statement.operations().is_empty());
    }
}
