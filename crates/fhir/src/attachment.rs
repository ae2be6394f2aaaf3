//! Attachment payloads.
//!
//! `Attachment.data` is a FHIR `base64Binary`. Payloads that do not decode to UTF-8 text carry
//! no text; plain narrative lives in the resource's `text.div` instead.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

/// Wire representation of a FHIR `Attachment`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    #[serde(rename = "contentType", default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub data: Option<String>,
}

impl Attachment {
    /// Text carried by this attachment, `None` when there is no (non-blank) payload.
    pub fn text(&self) -> Option<String> {
        let data = self.data.as_deref()?.trim();
        if data.is_empty() {
            return None;
        }
        decode_payload(data)
    }
}

fn decode_payload(data: &str) -> Option<String> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}
