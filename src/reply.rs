//! Normalization of generation responses.
//!
//! The generative-language API does not answer in a single stable shape:
//! depending on endpoint and API version the reply may carry a top-level
//! `text` field, the full `candidates` structure of the generateContent wire
//! format, or just a bare string. [`ReplyShape`] names the known shapes and
//! [`normalize`] turns any of them into the outbound text, with compact JSON
//! stringification as the fallback for anything unrecognized.

use serde_json::Value;

/// The response shapes a generation call is known to produce.
#[derive(Debug, PartialEq)]
pub enum ReplyShape<'a> {
    /// Object with a top-level `text` field.
    Direct(&'a str),
    /// Object with a `candidates` list; text lives in the first candidate's
    /// `content`.
    Candidate(String),
    /// A bare string.
    Plain(&'a str),
    /// Anything else; rendered by stringification.
    Opaque(&'a Value),
}

impl<'a> ReplyShape<'a> {
    /// Classify a raw response value, in precedence order: direct text
    /// field, candidate list, bare string, opaque.
    pub fn classify(value: &'a Value) -> Self {
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return ReplyShape::Direct(text);
        }
        if let Some(text) = first_candidate_text(value) {
            return ReplyShape::Candidate(text);
        }
        if let Some(text) = value.as_str() {
            return ReplyShape::Plain(text);
        }
        ReplyShape::Opaque(value)
    }

    /// Render the shape as outbound text.
    pub fn into_text(self) -> String {
        match self {
            ReplyShape::Direct(text) => text.to_string(),
            ReplyShape::Candidate(text) => text,
            ReplyShape::Plain(text) => text.to_string(),
            ReplyShape::Opaque(value) => value.to_string(),
        }
    }
}

/// Normalize a generation response into outbound text.
pub fn normalize(value: &Value) -> String {
    ReplyShape::classify(value).into_text()
}

/// Extract the text of `candidates[0].content`.
///
/// `content` is either a plain string or a generateContent object whose
/// `parts[].text` fragments are joined with newlines. A candidate that
/// yields no text at all (empty list, tool-call-only parts) returns `None`
/// so classification falls through to the stringify fallback.
fn first_candidate_text(value: &Value) -> Option<String> {
    let content = value.get("candidates")?.get(0)?.get("content")?;
    if let Some(text) = content.as_str() {
        return Some(text.to_string());
    }

    let parts = content.get("parts")?.as_array()?;
    let mut text = String::new();
    for part in parts {
        if let Some(fragment) = part.get("text").and_then(Value::as_str) {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(fragment);
        }
    }

    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_text_field() {
        let value = json!({ "text": "go back" });
        assert_eq!(normalize(&value), "go back");
    }

    #[test]
    fn candidate_with_string_content() {
        let value = json!({ "candidates": [{ "content": "go back" }] });
        assert_eq!(normalize(&value), "go back");
    }

    #[test]
    fn candidate_with_wire_format_parts() {
        let value = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "go back" }]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 3 }
        });
        assert_eq!(normalize(&value), "go back");
    }

    #[test]
    fn multiple_parts_join_with_newlines() {
        let value = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "scroll down" }, { "text": "then click" }] }
            }]
        });
        assert_eq!(normalize(&value), "scroll down\nthen click");
    }

    #[test]
    fn bare_string() {
        let value = json!("go back");
        assert_eq!(normalize(&value), "go back");
    }

    #[test]
    fn identical_content_is_shape_invariant() {
        let shapes = [
            json!({ "text": "go back" }),
            json!({ "candidates": [{ "content": "go back" }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "go back" }] } }] }),
            json!("go back"),
        ];
        for shape in &shapes {
            assert_eq!(normalize(shape), "go back", "shape: {shape}");
        }
    }

    #[test]
    fn direct_text_wins_over_candidates() {
        let value = json!({
            "text": "from text",
            "candidates": [{ "content": "from candidates" }]
        });
        assert_eq!(ReplyShape::classify(&value), ReplyShape::Direct("from text"));
    }

    #[test]
    fn unrecognized_value_stringifies() {
        let value = json!({ "status": "ok", "code": 200 });
        assert_eq!(normalize(&value), value.to_string());
    }

    #[test]
    fn empty_candidates_fall_back_to_stringify() {
        let value = json!({ "candidates": [] });
        assert_eq!(normalize(&value), "{\"candidates\":[]}");
    }

    #[test]
    fn textless_candidate_falls_back_to_stringify() {
        let value = json!({
            "candidates": [{ "content": { "parts": [{ "functionCall": { "name": "noop" } }] } }]
        });
        assert!(matches!(ReplyShape::classify(&value), ReplyShape::Opaque(_)));
    }

    #[test]
    fn null_stringifies() {
        assert_eq!(normalize(&Value::Null), "null");
    }
}
