//! Resource Classifier & Extractor.
//!
//! Turns one decoded [`Resource`] into at most one [`Fragment`]. This is a pure function:
//! absent fields degrade to empty strings or to no fragment at all, never to an error.

use crate::NonEmptyText;
use fhir::{resolve_patient_id, Resource, UnresolvableReference};

/// Where an entry came from: bundle file name and position in its `entry` list.
///
/// Ordering is by file name, then index, which gives accumulated lists a canonical order
/// that does not depend on which file happened to be read first.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Provenance {
    pub file_name: String,
    pub index: usize,
}

impl Provenance {
    pub fn new(file_name: impl Into<String>, index: usize) -> Self {
        Self {
            file_name: file_name.into(),
            index,
        }
    }
}

/// Demographics extracted from a `Patient` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientFragment {
    pub id: NonEmptyText,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
}

/// How a clinical entry refers to its patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    /// An explicit reference that resolved to a patient id.
    Linked(String),
    /// No subject reference at all.
    Missing,
    /// A subject reference that does not point at a patient we can join on.
    Unresolvable(UnresolvableReference),
}

impl Subject {
    fn from_reference(reference: Option<&str>) -> Self {
        match reference {
            None => Self::Missing,
            Some(reference) => match resolve_patient_id(reference) {
                Ok(id) => Self::Linked(id.to_string()),
                Err(reason) => Self::Unresolvable(reason),
            },
        }
    }
}

/// A partial piece of a patient's record extracted from one entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    Patient(PatientFragment),
    Condition { text: String, subject: Subject },
    Medication { text: String, subject: Subject },
    Report { patient_id: String, text: String },
}

/// Extract the fragment carried by `resource`, if any.
pub fn extract(resource: &Resource) -> Option<Fragment> {
    match resource {
        Resource::Patient(patient) => {
            let id = NonEmptyText::from_optional(patient.id.as_deref())?;
            Some(Fragment::Patient(PatientFragment {
                id,
                name: patient.display_name(),
                gender: patient.gender.clone().unwrap_or_default(),
                birth_date: patient.birth_date.clone().unwrap_or_default(),
            }))
        }
        Resource::Condition(condition) => Some(Fragment::Condition {
            text: condition.text()?.to_string(),
            subject: Subject::from_reference(condition.subject_reference()),
        }),
        Resource::MedicationRequest(request) => Some(Fragment::Medication {
            text: request.text()?.to_string(),
            subject: Subject::from_reference(request.subject_reference()),
        }),
        Resource::DiagnosticReport(report) => {
            let reference = report.subject_reference()?;
            let patient_id = resolve_patient_id(reference).ok()?.to_string();
            let text = report.report_text()?;
            Some(Fragment::Report { patient_id, text })
        }
        Resource::Other(_) => None,
    }
}
