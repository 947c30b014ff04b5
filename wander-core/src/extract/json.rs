//! JSON-object extraction from model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ExtractError;

/// Greedy match from the first `{` to the last `}`, across lines.
static JSON_OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid JSON object regex"));

/// Extract a JSON object from model output.
///
/// Tries the whole text first, then the outermost brace-delimited span, which
/// recovers objects wrapped in prose or markdown fences.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(value);
    }

    let candidate = JSON_OBJECT_REGEX
        .find(text)
        .ok_or(ExtractError::NoJsonObject)?;

    match serde_json::from_str::<Value>(candidate.as_str()) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(ExtractError::NoJsonObject),
        Err(e) => Err(ExtractError::InvalidJson(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let value = extract_json(r#"{"stages":[{"name":"Red Square"}]}"#).unwrap();
        assert_eq!(value["stages"][0]["name"], "Red Square");
    }

    #[test]
    fn test_prose_around_object() {
        let object = r#"{"stages":[{"name":"Arbat"}],"metadata":{"totalTime":"2h"}}"#;
        let text = format!("Sure! Here is your route:\n\n{object}\n\nEnjoy the walk.");

        let extracted = extract_json(&text).unwrap();
        let direct: Value = serde_json::from_str(object).unwrap();
        assert_eq!(extracted, direct);
    }

    #[test]
    fn test_markdown_fence() {
        let text = "```json\n{\n  \"stages\": []\n}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"stages": []}));
    }

    #[test]
    fn test_no_braces() {
        assert_eq!(
            extract_json("I cannot help with that."),
            Err(ExtractError::NoJsonObject)
        );
    }

    #[test]
    fn test_broken_object() {
        let result = extract_json("Here: {\"stages\": [ {\"name\": } ]} done");
        assert!(matches!(result, Err(ExtractError::InvalidJson(_))));
    }

    #[test]
    fn test_top_level_array_is_not_an_object() {
        // The array itself is rejected; the embedded object is what gets recovered
        let value = extract_json(r#"[{"stages": []}]"#).unwrap();
        assert_eq!(value, json!({"stages": []}));
    }
}
