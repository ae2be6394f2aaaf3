//! FHIR wire/boundary support for bundle ingestion.
//!
//! This crate provides **wire models** and **translation helpers** for Synthea-style FHIR
//! bundles read from disk:
//! - the bundle envelope and its `entry` list
//! - a typed sum type over the resource shapes the ingestion pipeline understands
//! - subject reference resolution (`urn:uuid:` and `Patient/<id>` forms)
//! - attachment payload decoding (base64 with a raw-text fallback)
//!
//! Wire structs are deliberately lenient: real bundles carry many more fields than we read,
//! and a missing field is an expected outcome modelled as `Option`, never an error.

pub mod attachment;
pub mod bundle;
pub mod patient;
pub mod reference;
pub mod resource;

pub use attachment::Attachment;
pub use bundle::Bundle;
pub use patient::{HumanName, PatientResource};
pub use reference::{resolve_patient_id, Reference, UnresolvableReference};
pub use resource::{
    CodeableConcept, ConditionResource, DiagnosticReportResource, MedicationRequestResource,
    Narrative, Resource,
};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialize `T` from a JSON value, reporting the failing field path on mismatch.
pub(crate) fn decode_at_path<'de, T>(kind: &str, value: &'de serde_json::Value) -> FhirResult<T>
where
    T: serde::Deserialize<'de>,
{
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        FhirError::Translation(format!("{kind} schema mismatch at {path}: {source}"))
    })
}
