//! Wire shapes of the JSON the server emits and accepts.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use preferred_id::api::HealthResponse;
use preferred_id::catalog::{NamingSystemJson, parse_naming_systems};
use preferred_id_core::{
    CatalogRecord, InformationModel, IssueType, OperationOutcome, Parameters,
    PreferredIdConformance, ResolutionFailure, ResponseBody, SupportedOperations, UniqueId,
    to_response,
};
use serde_json::{Value, json};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

// =============================================================================
// PARAMETERS
// =============================================================================

#[test]
fn test_parameters_shape() {
    let body = ResponseBody::Parameters(Parameters::preferred_id(Some(
        "2.16.840.1.113883.4.642.1.2".to_string(),
    )));
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(
        value,
        json!({
            "resourceType": "Parameters",
            "parameter": [{"name": "name", "valueString": "2.16.840.1.113883.4.642.1.2"}]
        })
    );
}

#[test]
fn test_parameters_without_value() {
    let value = serde_json::to_value(Parameters::preferred_id(None)).unwrap();
    assert_eq!(value["parameter"][0], json!({"name": "name"}));
}

// =============================================================================
// OPERATION OUTCOME
// =============================================================================

#[test]
fn test_operation_outcome_shape() {
    let response = to_response(ResolutionFailure::not_found("urn:x").into());
    let outcome = OperationOutcome::new(response.issue.into_iter().collect());
    let value = serde_json::to_value(ResponseBody::OperationOutcome(outcome)).unwrap();

    assert_eq!(value["resourceType"], "OperationOutcome");
    let issue = &value["issue"][0];
    assert_eq!(issue["severity"], "error");
    assert_eq!(issue["code"], "not-found");
    assert_eq!(
        issue["details"]["coding"][0]["system"],
        "http://vonk.fire.ly/fhir/ValueSet/OperationOutcomeIssueDetails"
    );
    assert_eq!(issue["details"]["coding"][0]["code"], "MSG_LOCAL_FAIL");
    assert!(issue["details"]["text"].as_str().unwrap().contains("urn:x"));
}

#[test]
fn test_issue_type_codes() {
    let codes: Vec<Value> = [
        IssueType::NotFound,
        IssueType::NotSupported,
        IssueType::Processing,
        IssueType::Exception,
    ]
    .iter()
    .map(|c| serde_json::to_value(c).unwrap())
    .collect();
    assert_eq!(
        codes,
        vec![
            json!("not-found"),
            json!("not-supported"),
            json!("processing"),
            json!("exception")
        ]
    );
}

// =============================================================================
// CAPABILITY STATEMENT
// =============================================================================

#[test]
fn test_capability_statement_shape() {
    let conformance = PreferredIdConformance::new(SupportedOperations::new(["preferred-id"]));
    let value =
        serde_json::to_value(conformance.capability_statement(InformationModel::r4())).unwrap();

    assert_eq!(value["resourceType"], "CapabilityStatement");
    assert_eq!(value["fhirVersion"], "4.0");
    assert_eq!(value["rest"][0]["mode"], "server");
    assert_eq!(
        value["rest"][0]["operation"][0],
        json!({
            "name": "preferred-id",
            "definition": "http://hl7.org/fhir/OperationDefinition/NamingSystem-preferred-id"
        })
    );
}

// =============================================================================
// NAMINGSYSTEM JSON
// =============================================================================

#[test]
fn test_naming_system_json_shape() {
    let record = CatalogRecord::new("gender", "AdministrativeGender", InformationModel::r4())
        .with_unique_id(UniqueId::uri("http://hl7.org/fhir/administrative-gender"));
    let value = serde_json::to_value(NamingSystemJson::from(&record)).unwrap();
    assert_eq!(
        value,
        json!({
            "resourceType": "NamingSystem",
            "id": "gender",
            "name": "AdministrativeGender",
            "uniqueId": [{"type": "uri", "value": "http://hl7.org/fhir/administrative-gender"}]
        })
    );
}

#[test]
fn test_exported_naming_system_imports_again() {
    let record = CatalogRecord::new("gender", "AdministrativeGender", InformationModel::r3())
        .with_unique_id(UniqueId::oid("2.16.840.1.113883.4.642.1.2"));
    let bytes = serde_json::to_vec(&NamingSystemJson::from(&record)).unwrap();

    let records = parse_naming_systems(&bytes, &InformationModel::r3()).unwrap();
    assert_eq!(records, vec![record]);
}
