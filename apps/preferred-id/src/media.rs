//! # FHIR Media Types
//!
//! `application/fhir+json` with the optional `fhirVersion` parameter, used
//! for content negotiation on the HTTP surface and towards a remote catalog.

use preferred_id_core::InformationModel;

/// FHIR JSON media type.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Media type for `model`, with `fhirVersion` when the model has one.
#[must_use]
pub fn fhir_json_for(model: &InformationModel) -> String {
    match model.fhir_version() {
        Some(version) => format!("{FHIR_JSON}; fhirVersion={version}"),
        None => FHIR_JSON.to_string(),
    }
}

/// Information model named by the first `fhirVersion` parameter in a
/// header value such as `Accept` or `Content-Type`.
///
/// Media ranges are comma separated, parameters semicolon separated;
/// parameter names are case-insensitive and values may be quoted.
/// Unknown versions are skipped.
#[must_use]
pub fn model_from_media_type(header: &str) -> Option<InformationModel> {
    header
        .split(',')
        .flat_map(|range| range.split(';').skip(1))
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("fhirVersion") {
                Some(value.trim().trim_matches('"'))
            } else {
                None
            }
        })
        .find_map(InformationModel::from_fhir_version)
}
