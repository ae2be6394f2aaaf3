//! Request and response bodies.
//!
//! Field names are part of the public HTTP contract; keep them stable.

use hca_core::PatientRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ROOT_MESSAGE: &str = "Hello World - GenAI Healthcare Assistant Backend is Running!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned with every non-2xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

impl ErrorRes {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// A free-text clinical note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MedicalNoteReq {
    pub medical_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExplainNoteRes {
    pub original_text: String,
    pub simplified_explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummarizeNoteRes {
    pub original_text: String,
    pub summary: String,
}

/// One stored patient, as served over HTTP.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub gender: String,
    #[serde(rename = "birthDate")]
    pub birth_date: String,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
    pub reports_text: Vec<String>,
}

impl From<PatientRecord> for PatientRes {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            gender: record.gender,
            birth_date: record.birth_date,
            conditions: record.conditions,
            medications: record.medications,
            reports_text: record.reports_text,
        }
    }
}
