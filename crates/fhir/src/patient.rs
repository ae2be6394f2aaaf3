//! FHIR Patient wire model and name rendering.
//!
//! Only the demographic fields the patient record keeps are modelled. Everything else on the
//! resource is ignored during deserialisation.

use serde::Deserialize;

/// Wire representation of a `Patient` resource.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PatientResource {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Vec<HumanName>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", default)]
    pub birth_date: Option<String>,
}

/// Wire representation of a human name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct HumanName {
    #[serde(rename = "use", default)]
    pub use_type: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub given: Vec<String>,
}

impl HumanName {
    /// Given names followed by the family name, separated by single spaces.
    ///
    /// Blank parts are left out, so a name with nothing in it renders as an empty string.
    pub fn display(&self) -> String {
        self.given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PatientResource {
    /// Display name taken from the first `name` element.
    pub fn display_name(&self) -> String {
        self.name.first().map(HumanName::display).unwrap_or_default()
    }
}
