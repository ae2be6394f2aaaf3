//! Typed resource sum type.
//!
//! Each bundle entry is decoded once, dispatching purely on `resourceType`. Unrecognised
//! types are preserved as [`Resource::Other`] so callers can ignore them explicitly.

use crate::attachment::Attachment;
use crate::patient::PatientResource;
use crate::reference::Reference;
use crate::FhirResult;
use serde::Deserialize;
use serde_json::Value;

/// The resource shapes understood by the ingestion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    Patient(PatientResource),
    Condition(ConditionResource),
    MedicationRequest(MedicationRequestResource),
    DiagnosticReport(DiagnosticReportResource),
    /// Any other `resourceType`, carried by name only.
    Other(String),
}

/// Wire representation of a FHIR `CodeableConcept` (text only).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CodeableConcept {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ConditionResource {
    #[serde(default)]
    pub code: Option<CodeableConcept>,

    #[serde(default)]
    pub subject: Option<Reference>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct MedicationRequestResource {
    #[serde(rename = "medicationCodeableConcept", default)]
    pub medication_codeable_concept: Option<CodeableConcept>,

    #[serde(default)]
    pub subject: Option<Reference>,
}

/// Wire representation of a FHIR `Narrative` (XHTML fragment only).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Narrative {
    #[serde(default)]
    pub div: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DiagnosticReportResource {
    #[serde(default)]
    pub subject: Option<Reference>,

    #[serde(default)]
    pub text: Option<Narrative>,

    #[serde(rename = "presentedForm", default)]
    pub presented_form: Vec<Attachment>,
}

fn concept_text(concept: Option<&CodeableConcept>) -> Option<&str> {
    concept
        .and_then(|c| c.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl ConditionResource {
    pub fn text(&self) -> Option<&str> {
        concept_text(self.code.as_ref())
    }

    /// The subject reference literal, if one is present.
    pub fn subject_reference(&self) -> Option<&str> {
        self.subject.as_ref().and_then(|s| s.reference.as_deref())
    }
}

impl MedicationRequestResource {
    pub fn text(&self) -> Option<&str> {
        concept_text(self.medication_codeable_concept.as_ref())
    }

    pub fn subject_reference(&self) -> Option<&str> {
        self.subject.as_ref().and_then(|s| s.reference.as_deref())
    }
}

impl DiagnosticReportResource {
    pub fn subject_reference(&self) -> Option<&str> {
        self.subject.as_ref().and_then(|s| s.reference.as_deref())
    }

    /// Report text: the decoded first presented form, else the narrative `div` verbatim.
    pub fn report_text(&self) -> Option<String> {
        self.presented_form
            .first()
            .and_then(Attachment::text)
            .or_else(|| self.narrative_text())
    }

    fn narrative_text(&self) -> Option<String> {
        let div = self.text.as_ref()?.div.as_deref()?;
        if div.trim().is_empty() {
            return None;
        }
        Some(div.to_string())
    }
}

impl Resource {
    /// Decode a bundle entry (`{"resource": {...}}`).
    ///
    /// Returns `Ok(None)` when the entry has no `resource` object or the resource has no
    /// string `resourceType`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::Translation`] when a recognised resource does not match its
    /// wire shape, naming the failing field path.
    pub fn from_entry(entry: &Value) -> FhirResult<Option<Self>> {
        match entry.get("resource") {
            Some(resource) if resource.is_object() => Self::from_resource(resource),
            _ => Ok(None),
        }
    }

    /// Decode a bare resource object.
    ///
    /// # Errors
    ///
    /// See [`Resource::from_entry`].
    pub fn from_resource(resource: &Value) -> FhirResult<Option<Self>> {
        let Some(resource_type) = resource.get("resourceType").and_then(Value::as_str) else {
            return Ok(None);
        };

        let decoded = match resource_type {
            "Patient" => Self::Patient(crate::decode_at_path(resource_type, resource)?),
            "Condition" => Self::Condition(crate::decode_at_path(resource_type, resource)?),
            "MedicationRequest" => {
                Self::MedicationRequest(crate::decode_at_path(resource_type, resource)?)
            }
            "DiagnosticReport" => {
                Self::DiagnosticReport(crate::decode_at_path(resource_type, resource)?)
            }
            other => Self::Other(other.to_string()),
        };
        Ok(Some(decoded))
    }

    /// The `resourceType` this value was decoded from.
    pub fn resource_type(&self) -> &str {
        match self {
            Self::Patient(_) => "Patient",
            Self::Condition(_) => "Condition",
            Self::MedicationRequest(_) => "MedicationRequest",
            Self::DiagnosticReport(_) => "DiagnosticReport",
            Self::Other(tag) => tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FhirError;
    use serde_json::json;

    #[test]
    fn dispatches_on_resource_type() {
        let condition = Resource::from_entry(&json!({
            "resource": {
                "resourceType": "Condition",
                "code": {"text": "Hypertension"},
                "subject": {"reference": "urn:uuid:p1"}
            }
        }))
        .expect("decode")
        .expect("resource present");

        let Resource::Condition(condition) = condition else {
            panic!("expected a condition");
        };
        assert_eq!(condition.text(), Some("Hypertension"));
        assert_eq!(condition.subject_reference(), Some("urn:uuid:p1"));
    }

    #[test]
    fn medication_text_comes_from_codeable_concept() {
        let resource = Resource::from_resource(&json!({
            "resourceType": "MedicationRequest",
            "medicationCodeableConcept": {"text": "lisinopril 10 MG Oral Tablet"}
        }))
        .expect("decode")
        .expect("resource present");

        let Resource::MedicationRequest(med) = resource else {
            panic!("expected a medication request");
        };
        assert_eq!(med.text(), Some("lisinopril 10 MG Oral Tablet"));
        assert_eq!(med.subject_reference(), None);
    }

    #[test]
    fn blank_concept_text_is_absent() {
        let condition = ConditionResource {
            code: Some(CodeableConcept {
                text: Some("  ".into()),
            }),
            subject: None,
        };
        assert_eq!(condition.text(), None);
    }

    #[test]
    fn report_text_reads_first_presented_form() {
        let resource = Resource::from_resource(&json!({
            "resourceType": "DiagnosticReport",
            "subject": {"reference": "urn:uuid:p1"},
            "presentedForm": [
                {"contentType": "text/plain", "data": "Tm9ybWFsIHJlc3VsdHM="},
                {"contentType": "text/plain", "data": "c2Vjb25k"}
            ]
        }))
        .expect("decode")
        .expect("resource present");

        let Resource::DiagnosticReport(report) = resource else {
            panic!("expected a diagnostic report");
        };
        assert_eq!(report.report_text().as_deref(), Some("Normal results"));
    }

    #[test]
    fn report_text_falls_back_to_narrative_div() {
        let resource = Resource::from_resource(&json!({
            "resourceType": "DiagnosticReport",
            "text": {"status": "generated", "div": "<div>Normal results</div>"}
        }))
        .expect("decode")
        .expect("resource present");

        let Resource::DiagnosticReport(report) = resource else {
            panic!("expected a diagnostic report");
        };
        assert_eq!(
            report.report_text().as_deref(),
            Some("<div>Normal results</div>")
        );
    }

    #[test]
    fn short_narrative_text_is_kept_verbatim() {
        let report = DiagnosticReportResource {
            text: Some(Narrative {
                div: Some("Mild".into()),
            }),
            ..Default::default()
        };
        assert_eq!(report.report_text().as_deref(), Some("Mild"));
    }

    #[test]
    fn decoded_presented_form_wins_over_narrative() {
        let report = DiagnosticReportResource {
            text: Some(Narrative {
                div: Some("<div>narrative</div>".into()),
            }),
            presented_form: vec![Attachment {
                content_type: Some("text/plain".into()),
                data: Some("TWlsZA==".into()),
            }],
            ..Default::default()
        };
        assert_eq!(report.report_text().as_deref(), Some("Mild"));
    }

    #[test]
    fn undecodable_form_and_blank_narrative_have_no_text() {
        let report = DiagnosticReportResource {
            text: Some(Narrative {
                div: Some("  ".into()),
            }),
            presented_form: vec![Attachment {
                content_type: Some("text/plain".into()),
                data: Some("not base64!".into()),
            }],
            ..Default::default()
        };
        assert_eq!(report.report_text(), None);
    }

    #[test]
    fn unknown_types_are_kept_by_name() {
        let resource = Resource::from_resource(&json!({"resourceType": "Encounter"}))
            .expect("decode")
            .expect("resource present");
        assert_eq!(resource, Resource::Other("Encounter".into()));
        assert_eq!(resource.resource_type(), "Encounter");
    }

    #[test]
    fn entries_without_type_are_skipped() {
        assert_eq!(Resource::from_entry(&json!({})).expect("decode"), None);
        assert_eq!(
            Resource::from_entry(&json!({"resource": {"id": "x"}})).expect("decode"),
            None
        );
        assert_eq!(
            Resource::from_entry(&json!({"resource": "Patient"})).expect("decode"),
            None
        );
    }

    #[test]
    fn shape_mismatch_reports_the_field_path() {
        let err = Resource::from_resource(&json!({
            "resourceType": "Patient",
            "name": [{"given": "Jane"}]
        }))
        .expect_err("given must be a list");

        let FhirError::Translation(message) = err else {
            panic!("expected a translation error");
        };
        assert!(message.starts_with("Patient schema mismatch at name"), "{message}");
        assert!(message.contains("given"), "{message}");
    }
}
