//! # Consistency Guard
//!
//! A resolved record must belong to the same information model as the
//! context that asked for it. A mismatch is a hard rejection.

use crate::outcome::ResolutionFailure;
use crate::types::{CatalogRecord, InformationModel};

/// Check `record` against the requester's model.
pub fn check(record: &CatalogRecord, expected: &InformationModel) -> Result<(), ResolutionFailure> {
    if &record.information_model == expected {
        Ok(())
    } else {
        Err(ResolutionFailure::model_mismatch(
            &record.reference(),
            &record.information_model,
            expected,
        ))
    }
}
