//! Subject reference resolution.
//!
//! Synthea transaction bundles link resources to their patient through `urn:uuid:<id>`
//! references. Relative `Patient/<id>` references are accepted as well. Anything else
//! (contained, absolute URL, other resource types) cannot be joined to a patient.

use serde::Deserialize;
use std::fmt;

const URN_UUID_PREFIX: &str = "urn:uuid:";
const PATIENT_PREFIX: &str = "Patient/";

/// Wire representation of a FHIR `Reference`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Reference {
    #[serde(default)]
    pub reference: Option<String>,
}

/// A reference that cannot be turned into a patient join key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvableReference {
    /// A contained reference (starts with `#`)
    Contained(String),
    /// An absolute URL or a reference to a resource type other than Patient
    External(String),
    /// Empty or otherwise malformed
    Invalid(String),
}

impl fmt::Display for UnresolvableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained(id) => write!(f, "contained reference: {id}"),
            Self::External(url) => write!(f, "external reference: {url}"),
            Self::Invalid(reason) => write!(f, "invalid reference: {reason}"),
        }
    }
}

impl std::error::Error for UnresolvableReference {}

/// Resolve a literal reference string to the referenced patient id.
///
/// # Errors
///
/// Returns [`UnresolvableReference`] when the reference is not a `urn:uuid:` or
/// `Patient/<id>` reference, or when the id part is empty.
pub fn resolve_patient_id(reference: &str) -> Result<&str, UnresolvableReference> {
    let reference = reference.trim();

    let id = if let Some(rest) = reference.strip_prefix(URN_UUID_PREFIX) {
        rest
    } else if let Some(rest) = reference.strip_prefix(PATIENT_PREFIX) {
        // Drop a trailing version suffix: Patient/<id>/_history/<v>
        rest.split('/').next().unwrap_or_default()
    } else if reference.starts_with('#') {
        return Err(UnresolvableReference::Contained(reference.to_string()));
    } else if reference.is_empty() {
        return Err(UnresolvableReference::Invalid("empty reference".into()));
    } else {
        return Err(UnresolvableReference::External(reference.to_string()));
    };

    if id.is_empty() {
        return Err(UnresolvableReference::Invalid(format!(
            "missing id in '{reference}'"
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_urn_uuid_prefix() {
        assert_eq!(resolve_patient_id("urn:uuid:p1"), Ok("p1"));
        assert_eq!(
            resolve_patient_id("urn:uuid:0b4f5d47-43b7-4bd4-a0e3-4a55a0b4f0e2"),
            Ok("0b4f5d47-43b7-4bd4-a0e3-4a55a0b4f0e2")
        );
    }

    #[test]
    fn accepts_relative_patient_references() {
        assert_eq!(resolve_patient_id("Patient/p1"), Ok("p1"));
        assert_eq!(resolve_patient_id("Patient/p1/_history/3"), Ok("p1"));
    }

    #[test]
    fn rejects_other_forms() {
        assert!(matches!(
            resolve_patient_id("#contained"),
            Err(UnresolvableReference::Contained(_))
        ));
        assert!(matches!(
            resolve_patient_id("Practitioner/x"),
            Err(UnresolvableReference::External(_))
        ));
        assert!(matches!(
            resolve_patient_id("urn:uuid:"),
            Err(UnresolvableReference::Invalid(_))
        ));
        assert!(matches!(
            resolve_patient_id("  "),
            Err(UnresolvableReference::Invalid(_))
        ));
    }
}
