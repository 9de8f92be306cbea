//! Reading the static-props payload back out of the document.

use serde_json::Value;
use voyage_render::{StaticPropsPayload, PAYLOAD_ID};

use crate::dom::{Document, NodeId};

/// Why the payload could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("no `#{0}` element in the document")]
    Missing(&'static str),

    #[error("payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("payload props are not a JSON object")]
    NotAnObject,
}

/// The payload `<script>` element, if present.
pub fn payload_element(doc: &Document) -> Option<NodeId> {
    doc.get_element_by_id(PAYLOAD_ID)
        .filter(|id| doc.tag(*id) == Some("script"))
}

/// Parse the payload embedded in the document.
pub fn read_payload(doc: &Document) -> Result<StaticPropsPayload, PayloadError> {
    let element = payload_element(doc).ok_or(PayloadError::Missing(PAYLOAD_ID))?;
    let payload = StaticPropsPayload::from_json(&doc.text_content(element))
        .map_err(|e| PayloadError::Malformed(e.to_string()))?;

    if !payload.props.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    Ok(payload)
}

/// The static props, or an empty object when the payload is missing or
/// malformed. Never fails.
pub fn read_static_props(doc: &Document) -> Value {
    match read_payload(doc) {
        Ok(payload) => payload.props,
        Err(err) => {
            tracing::warn!(error = %err, "static props unavailable, using empty props");
            Value::Object(Default::default())
        }
    }
}
