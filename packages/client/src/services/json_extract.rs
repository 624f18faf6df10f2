//! Extraction of a JSON value embedded in free-form model output.
//!
//! Grammar, applied in order:
//! 1. If the text contains a fenced code block (three backticks, optional
//!    `json` tag), the block body is the candidate; otherwise the whole text.
//! 2. The candidate is cut from the first opening bracket of the requested
//!    shape (`{` or `[`) through the last matching closing bracket.
//! 3. The slice is parsed with `serde_json`.
//!
//! If the fenced body has no bracket of the requested shape, step 2 runs on
//! the whole text instead.

use serde::de::DeserializeOwned;
use thiserror::Error;

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn brackets(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON {0:?} found in response")]
    NotFound(JsonShape),
    #[error("embedded JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Locate the JSON slice of the given shape.
pub fn extract_json(text: &str, shape: JsonShape) -> Option<&str> {
    let trimmed = text.trim();
    fenced_body(trimmed)
        .and_then(|body| bracket_slice(body, shape))
        .or_else(|| bracket_slice(trimmed, shape))
}

pub fn parse_embedded<T: DeserializeOwned>(
    text: &str,
    shape: JsonShape,
) -> Result<T, ExtractError> {
    let slice = extract_json(text, shape).ok_or(ExtractError::NotFound(shape))?;
    Ok(serde_json::from_str(slice)?)
}

fn bracket_slice(text: &str, shape: JsonShape) -> Option<&str> {
    let (open, close) = shape.brackets();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Body of the first fenced block, without the info string line.
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let after_marker = &text[open + FENCE.len()..];
    let body_start = after_marker.find('\n').map(|i| i + 1).unwrap_or(after_marker.len());
    let body = &after_marker[body_start..];
    let end = body.find(FENCE).unwrap_or(body.len());
    Some(body[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn plain_object() {
        assert_eq!(extract_json(r#"{"a":1}"#, JsonShape::Object), Some(r#"{"a":1}"#));
    }

    #[test]
    fn object_in_prose() {
        let text = "Berikut hasilnya:\n{\"summary\": \"x\", \"nested\": {\"k\": 1}}\nSemoga membantu!";
        let value: Value = parse_embedded(text, JsonShape::Object).unwrap();
        assert_eq!(value["nested"]["k"], 1);
    }

    #[test]
    fn fenced_array_with_tag() {
        let text = "```json\n[{\"question\": \"q\"}]\n```";
        let value: Value = parse_embedded(text, JsonShape::Array).unwrap();
        assert_eq!(value[0]["question"], "q");
    }

    #[test]
    fn fenced_without_tag_and_trailing_prose() {
        let text = "Here:\n```\n{\"a\": [1, 2]}\n```\nNote: the {braces} above.";
        // the fence keeps the trailing prose out of the slice
        assert_eq!(extract_json(text, JsonShape::Object), Some("{\"a\": [1, 2]}"));
    }

    #[test]
    fn fence_without_requested_shape_falls_back_to_whole_text() {
        let text = "```\nno json here\n```\n[1, 2, 3]";
        assert_eq!(extract_json(text, JsonShape::Array), Some("[1, 2, 3]"));
    }

    #[test]
    fn missing_brackets_is_not_found() {
        let err = parse_embedded::<Value>("tidak ada json", JsonShape::Array).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(JsonShape::Array)));
        assert_eq!(extract_json("} before {", JsonShape::Object), None);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_embedded::<Value>("{\"a\": }", JsonShape::Object).unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn array_inside_object_is_found_for_array_shape() {
        let text = r#"{"items": [1, 2]}"#;
        assert_eq!(extract_json(text, JsonShape::Array), Some("[1, 2]"));
    }
}
