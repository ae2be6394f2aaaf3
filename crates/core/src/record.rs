//! The flat patient record written to the document store.

use serde::{Deserialize, Serialize};

/// One assembled patient: demographics plus everything linked to them.
///
/// The serialised shape is the document shape: the identifier is stored under `_id` and the
/// birth date under `birthDate`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub gender: String,
    #[serde(rename = "birthDate")]
    pub birth_date: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub reports_text: Vec<String>,
}
