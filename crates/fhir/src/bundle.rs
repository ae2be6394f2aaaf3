//! Bundle envelope parsing.
//!
//! A bundle is parsed in two stages. The envelope is decoded eagerly so that a malformed file
//! fails as a whole, while each entry is kept as raw JSON and decoded into a [`Resource`]
//! individually. One bad entry therefore never hides its siblings.

use crate::resource::Resource;
use crate::{FhirError, FhirResult};
use serde::Deserialize;
use serde_json::Value;

/// A parsed bundle envelope.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bundle {
    entries: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct BundleWire {
    #[serde(default)]
    entry: Option<Vec<Value>>,
}

impl Bundle {
    /// Parse a bundle from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the text is not JSON, is not an object, or if `entry` is
    /// present but is not an array.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(&value)
    }

    /// Parse a bundle from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// See [`Bundle::parse`].
    pub fn from_value(value: &Value) -> FhirResult<Self> {
        if !value.is_object() {
            return Err(FhirError::InvalidInput(
                "bundle must be a JSON object".into(),
            ));
        }
        let wire: BundleWire = crate::decode_at_path("Bundle", value)?;
        Ok(Self {
            entries: wire.entry,
        })
    }

    /// Returns `true` when the bundle carries an `entry` list (possibly empty).
    pub fn has_entries(&self) -> bool {
        self.entries.is_some()
    }

    /// Number of raw entries, zero when `entry` is missing.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode every entry into a [`Resource`], in bundle order.
    ///
    /// Entries without a `resource` object or without a `resourceType` yield `Ok(None)`.
    pub fn resources(&self) -> impl Iterator<Item = FhirResult<Option<Resource>>> + '_ {
        self.entries
            .iter()
            .flatten()
            .map(Resource::from_entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_entry_is_not_an_error() {
        let bundle = Bundle::parse(r#"{"resourceType":"Bundle","type":"transaction"}"#)
            .expect("bundle without entry should parse");
        assert!(!bundle.has_entries());
        assert!(bundle.is_empty());
        assert_eq!(bundle.resources().count(), 0);
    }

    #[test]
    fn rejects_non_object_documents() {
        let err = Bundle::parse("[1, 2, 3]").expect_err("arrays are not bundles");
        assert!(matches!(err, FhirError::InvalidInput(_)));
    }

    #[test]
    fn rejects_entry_that_is_not_a_list() {
        let err = Bundle::from_value(&json!({"entry": {"resource": {}}}))
            .expect_err("entry must be an array");
        assert!(matches!(err, FhirError::Translation(_)));
    }

    #[test]
    fn invalid_json_surfaces_as_json_error() {
        let err = Bundle::parse("{ not json").expect_err("should fail");
        assert!(matches!(err, FhirError::InvalidJson(_)));
    }

    #[test]
    fn decodes_entries_independently() {
        let bundle = Bundle::from_value(&json!({
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "p1"}},
                {"resource": {"resourceType": "Patient", "name": 42}},
                {"fullUrl": "urn:uuid:nothing"},
                {"resource": {"resourceType": "Observation"}}
            ]
        }))
        .expect("bundle should parse");

        let decoded: Vec<_> = bundle.resources().collect();
        assert_eq!(decoded.len(), 4);
        assert!(matches!(decoded[0], Ok(Some(Resource::Patient(_)))));
        assert!(decoded[1].is_err());
        assert!(matches!(decoded[2], Ok(None)));
        assert!(matches!(&decoded[3], Ok(Some(Resource::Other(tag))) if tag == "Observation"));
    }
}
