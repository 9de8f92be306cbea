//! The static-props payload embedded in every rendered page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `id` of the payload `<script>` element.
pub const PAYLOAD_ID: &str = "__VOYAGE_DATA__";

/// Data the server hands to the hydration bootstrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPropsPayload {
    /// URL the page was rendered for (path and query).
    pub url: String,
    /// Pattern of the matched route.
    pub route: String,
    /// Fingerprint of the server's route table.
    pub fingerprint: String,
    /// Static props the component rendered with.
    pub props: Value,
}

impl StaticPropsPayload {
    /// Serialize to JSON that is safe inside a `<script>` element.
    pub fn to_script_json(&self) -> String {
        // Serializing a struct of strings and a `Value` cannot fail.
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        escape_json_for_script(&json)
    }

    /// The complete `<script type="application/json">` element.
    pub fn to_script_tag(&self) -> String {
        format!(
            "<script type=\"application/json\" id=\"{}\">{}</script>",
            PAYLOAD_ID,
            self.to_script_json()
        )
    }

    /// Parse payload JSON read back from the document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Escape characters that could end the script element or break parsing.
///
/// The result is still valid JSON with the same value.
pub fn escape_json_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(props: Value) -> StaticPropsPayload {
        StaticPropsPayload {
            url: "/deals?month=may".to_string(),
            route: "/deals".to_string(),
            fingerprint: "0123456789abcdef".to_string(),
            props,
        }
    }

    #[test]
    fn test_script_tag_cannot_be_closed_by_props() {
        let payload = payload(json!({ "note": "</script><script>alert(1)</script>" }));
        let tag = payload.to_script_tag();

        assert!(tag.starts_with("<script type=\"application/json\" id=\"__VOYAGE_DATA__\">"));
        assert_eq!(tag.matches("</script>").count(), 1);
        assert!(tag.ends_with("</script>"));
    }

    #[test]
    fn test_escaped_json_keeps_value() {
        let payload = payload(json!({ "text": "a < b && c > d \u{2028} end" }));
        let escaped = payload.to_script_json();

        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('\u{2028}'));
        assert_eq!(StaticPropsPayload::from_json(&escaped).unwrap(), payload);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(StaticPropsPayload::from_json("{\"url\":1}").is_err());
        assert!(StaticPropsPayload::from_json("not json").is_err());
    }
}
