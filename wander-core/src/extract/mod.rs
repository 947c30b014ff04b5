//! Turning raw model text into raw, itinerary-shaped JSON.
//!
//! Two response formats are supported; both produce a `serde_json::Value`
//! that the normalizer turns into an [`Itinerary`](crate::types::Itinerary).

mod json;
pub mod tagged;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractError;

pub use json::extract_json;
pub use tagged::{extract_tagged, split_sections, TaggedParser, TaggedRoute, TaggedStage};

/// Which shape the provider answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// A JSON object, possibly wrapped in prose.
    #[default]
    Json,
    /// Emoji-tagged free text; stages are geocoded after extraction.
    Tagged,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Tagged => "tagged",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "tagged" => Ok(ResponseFormat::Tagged),
            other => Err(format!("Unknown response format: {}", other)),
        }
    }
}

/// Extract raw itinerary JSON from model text in the given format.
///
/// Tagged text with no numbered stages counts as having no structured content.
pub fn extract(format: ResponseFormat, text: &str) -> Result<Value, ExtractError> {
    match format {
        ResponseFormat::Json => extract_json(text),
        ResponseFormat::Tagged => {
            let route = extract_tagged(text);
            if route.stages.is_empty() {
                return Err(ExtractError::NoTaggedStages);
            }
            Ok(route.to_raw())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<ResponseFormat>(), Ok(ResponseFormat::Json));
        let padded = " Tagged ".parse::<ResponseFormat>();
        assert_eq!(padded, Ok(ResponseFormat::Tagged));
        assert!("xml".parse::<ResponseFormat>().is_err());
    }

    #[test]
    fn test_extract_tagged_without_stages() {
        assert_eq!(
            extract(ResponseFormat::Tagged, "no numbered sections here"),
            Err(ExtractError::NoTaggedStages)
        );
    }

    #[test]
    fn test_extract_tagged_to_raw() {
        let raw = extract(ResponseFormat::Tagged, "🗺 Overview: hi\n\n1. Arbat").unwrap();
        assert_eq!(raw["stages"][0]["name"], "Arbat");
        assert_eq!(raw["metadata"]["overview"], "hi");
    }
}
