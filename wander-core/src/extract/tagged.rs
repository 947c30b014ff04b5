//! Extraction of itinerary stages from the emoji-tagged text format.
//!
//! The model is asked to answer with blank-line separated sections:
//!
//! ```text
//! 🗺️ Overview: A relaxed loop through the historic centre.
//!
//! 1. Red Square
//! ⏱️ Time: 40 minutes
//! 📝 Description: The heart of the city.
//! • Walk past St. Basil's Cathedral
//! 💡 Tip: Come early to avoid crowds
//! 🚶 Transition: 5 minutes on foot to the next stop
//! ```
//!
//! Lines inside a stage are classified through [`LINE_RULES`]; anything else
//! is ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::types::Coordinates;

pub const OVERVIEW_MARKER: &str = "🗺";
pub const DURATION_MARKER: &str = "⏱";
pub const DESCRIPTION_MARKER: &str = "📝";
pub const TIP_MARKER: &str = "💡";
pub const TRANSITION_MARKER: &str = "🚶";

/// Bullets beyond this many are dropped.
pub const MAX_ACTIVITIES: usize = 3;

const VARIATION_SELECTOR: char = '\u{FE0F}';

static STAGE_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("Invalid stage header regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageField {
    VisitTime,
    Description,
    Activity,
    Tip,
    WalkingDescription,
}

struct LineRule {
    prefix: &'static str,
    labels: &'static [&'static str],
    field: StageField,
}

const LINE_RULES: &[LineRule] = &[
    LineRule {
        prefix: DURATION_MARKER,
        labels: &["Time:", "Duration:"],
        field: StageField::VisitTime,
    },
    LineRule {
        prefix: DESCRIPTION_MARKER,
        labels: &["Description:"],
        field: StageField::Description,
    },
    LineRule {
        prefix: "•",
        labels: &[],
        field: StageField::Activity,
    },
    LineRule {
        prefix: "- ",
        labels: &[],
        field: StageField::Activity,
    },
    LineRule {
        prefix: "* ",
        labels: &[],
        field: StageField::Activity,
    },
    LineRule {
        prefix: TIP_MARKER,
        labels: &["Tip:"],
        field: StageField::Tip,
    },
    LineRule {
        prefix: TRANSITION_MARKER,
        labels: &["Transition:", "Walk:"],
        field: StageField::WalkingDescription,
    },
];

/// A stage as read from tagged text, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedStage {
    pub name: String,
    pub visit_time: Option<String>,
    pub description: Option<String>,
    pub activities: Vec<String>,
    pub tips: Vec<String>,
    pub walking_description: Option<String>,
    /// Filled in by the geocoding enricher.
    pub coordinates: Option<Coordinates>,
}

impl TaggedStage {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().trim_matches('*').trim().to_string(),
            ..Default::default()
        }
    }

    fn apply(&mut self, field: StageField, value: String) {
        match field {
            StageField::VisitTime => self.visit_time = Some(value),
            StageField::Description => match &mut self.description {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(&value);
                }
                None => self.description = Some(value),
            },
            StageField::Activity => {
                if self.activities.len() < MAX_ACTIVITIES {
                    self.activities.push(value);
                }
            }
            StageField::Tip => self.tips.push(value),
            StageField::WalkingDescription => self.walking_description = Some(value),
        }
    }

    fn classify_line(&mut self, line: &str) {
        let line = line.trim();
        let Some(rule) = LINE_RULES.iter().find(|r| line.starts_with(r.prefix)) else {
            return;
        };

        let rest = line[rule.prefix.len()..]
            .trim_start_matches(VARIATION_SELECTOR)
            .trim();
        let value = strip_label(rest, rule.labels);
        if !value.is_empty() {
            self.apply(rule.field, value.to_string());
        }
    }

    /// Raw, itinerary-shaped JSON for the normalizer. Absent fields are left
    /// out so the normalizer's defaults apply.
    pub fn to_raw(&self) -> Value {
        let mut stage = Map::new();
        stage.insert("name".to_string(), json!(self.name));
        if let Some(description) = &self.description {
            stage.insert("description".to_string(), json!(description));
        }
        if let Some(visit_time) = &self.visit_time {
            stage.insert("visitTime".to_string(), json!(visit_time));
        }
        stage.insert("activities".to_string(), json!(self.activities));
        stage.insert("tips".to_string(), json!(self.tips));
        if let Some(walking) = &self.walking_description {
            stage.insert(
                "transitionFromPrevious".to_string(),
                json!({ "walkingDescription": walking }),
            );
        }
        if let Some(c) = self.coordinates {
            stage.insert("coordinates".to_string(), json!([c.lat, c.lon]));
        }
        Value::Object(stage)
    }
}

/// Remove a leading label such as "Time:" (ASCII case-insensitive).
fn strip_label<'a>(text: &'a str, labels: &[&str]) -> &'a str {
    for label in labels {
        if let Some(head) = text.get(..label.len()) {
            if head.eq_ignore_ascii_case(label) {
                return text[label.len()..].trim();
            }
        }
    }
    text
}

/// Incremental parser: feed it sections, get stages back as they complete.
///
/// A stage is complete when the next numbered section starts, or when
/// [`TaggedParser::finish`] is called after the last section.
#[derive(Debug, Default)]
pub struct TaggedParser {
    overview: Option<String>,
    current: Option<TaggedStage>,
}

impl TaggedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one section. Returns the previous stage if this section starts a
    /// new one.
    pub fn feed(&mut self, section: &str) -> Option<TaggedStage> {
        let mut lines = section.lines();
        let first = lines.next().unwrap_or_default().trim();

        if first.starts_with(OVERVIEW_MARKER) {
            // First overview wins; the body may span several lines
            if self.overview.is_none() {
                let body = section.trim_start()[OVERVIEW_MARKER.len()..]
                    .trim_start_matches(VARIATION_SELECTOR)
                    .trim();
                let summary = strip_label(body, &["Overview:"]);
                if !summary.is_empty() {
                    self.overview = Some(summary.to_string());
                }
            }
            return None;
        }

        if let Some(caps) = STAGE_HEADER_REGEX.captures(first) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let mut stage = TaggedStage::new(name);
            for line in lines {
                stage.classify_line(line);
            }
            return self.current.replace(stage);
        }

        // Continuation of the stage in progress, e.g. a blank line after the header
        if let Some(stage) = &mut self.current {
            for line in section.lines() {
                stage.classify_line(line);
            }
        }
        None
    }

    /// Take the stage still in progress, if any.
    pub fn finish(&mut self) -> Option<TaggedStage> {
        self.current.take()
    }

    pub fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
}

/// Split text into sections on blank lines.
pub fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
}

/// A whole route read from tagged text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedRoute {
    pub overview: Option<String>,
    pub stages: Vec<TaggedStage>,
}

impl TaggedRoute {
    pub fn to_raw(&self) -> Value {
        let stages: Vec<Value> = self.stages.iter().map(TaggedStage::to_raw).collect();
        let mut metadata = Map::new();
        if let Some(overview) = &self.overview {
            metadata.insert("overview".to_string(), json!(overview));
        }
        json!({ "stages": stages, "metadata": metadata })
    }
}

/// Parse tagged text in one go, without geocoding.
pub fn extract_tagged(text: &str) -> TaggedRoute {
    let mut parser = TaggedParser::new();
    let mut stages = Vec::new();

    for section in split_sections(text) {
        if let Some(stage) = parser.feed(&section) {
            stages.push(stage);
        }
    }
    if let Some(stage) = parser.finish() {
        stages.push(stage);
    }

    TaggedRoute {
        overview: parser.overview().map(str::to_string),
        stages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_STAGES: &str = "🗺️ Overview: A short loop through the centre.

1. Red Square
⏱️ Time: 40 minutes
📝 Description: The main square of Moscow.
• See St. Basil's Cathedral
• Visit the GUM arcade
• Watch the changing of the guard
• Take a selfie
• Buy ice cream
💡 Tip: Arrive before 10am
💡 Tip: Bring water

2. **Zaryadye Park**
⏱ Duration: 1 hour
📝 Modern park by the river.
🚶 Transition: 7 minutes on foot along Varvarka street
- Stand on the floating bridge
This line is not tagged and is ignored
";

    #[test]
    fn test_two_stages_in_order_with_activity_cap() {
        let route = extract_tagged(TWO_STAGES);

        assert_eq!(
            route.overview.as_deref(),
            Some("A short loop through the centre.")
        );
        assert_eq!(route.stages.len(), 2);

        let first = &route.stages[0];
        assert_eq!(first.name, "Red Square");
        assert_eq!(first.visit_time.as_deref(), Some("40 minutes"));
        let description = first.description.as_deref();
        assert_eq!(description, Some("The main square of Moscow."));
        assert_eq!(first.activities.len(), MAX_ACTIVITIES);
        assert_eq!(first.activities[2], "Watch the changing of the guard");
        assert_eq!(first.tips, vec!["Arrive before 10am", "Bring water"]);
        assert_eq!(first.walking_description, None);

        let second = &route.stages[1];
        assert_eq!(second.name, "Zaryadye Park");
        assert_eq!(second.visit_time.as_deref(), Some("1 hour"));
        let description = second.description.as_deref();
        assert_eq!(description, Some("Modern park by the river."));
        assert_eq!(
            second.walking_description.as_deref(),
            Some("7 minutes on foot along Varvarka street")
        );
        assert_eq!(second.activities, vec!["Stand on the floating bridge"]);
    }

    #[test]
    fn test_parser_emits_previous_stage_on_next_header() {
        let mut parser = TaggedParser::new();

        assert_eq!(parser.feed("🗺 Overview: test"), None);
        assert_eq!(parser.feed("1. First\n⏱ Time: 10 minutes"), None);

        let finished = parser.feed("2. Second").unwrap();
        assert_eq!(finished.name, "First");
        assert_eq!(finished.visit_time.as_deref(), Some("10 minutes"));

        assert_eq!(parser.finish().unwrap().name, "Second");
        assert_eq!(parser.finish(), None);
        assert_eq!(parser.overview(), Some("test"));
    }

    #[test]
    fn test_continuation_section_belongs_to_current_stage() {
        let route = extract_tagged("1. Arbat\n\n📝 Old pedestrian street\n• Street musicians");
        assert_eq!(route.stages.len(), 1);
        assert_eq!(
            route.stages[0].description.as_deref(),
            Some("Old pedestrian street")
        );
        assert_eq!(route.stages[0].activities, vec!["Street musicians"]);
    }

    #[test]
    fn test_text_without_numbered_sections() {
        let route = extract_tagged("Sorry, I can't plan that route.\n\nMaybe try again?");
        assert!(route.stages.is_empty());
        assert_eq!(route.overview, None);
    }

    #[test]
    fn test_split_sections_ignores_whitespace_lines() {
        let sections = split_sections("a\nb\n   \n\nc\n");
        assert_eq!(sections, vec!["a\nb".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_to_raw_omits_absent_fields() {
        let mut stage = TaggedStage::new("Kremlin");
        stage.coordinates = Some(Coordinates::new(55.752, 37.617));

        let raw = stage.to_raw();
        assert_eq!(raw["name"], "Kremlin");
        assert!(raw.get("visitTime").is_none());
        assert!(raw.get("transitionFromPrevious").is_none());
        assert_eq!(raw["coordinates"], json!([55.752, 37.617]));
    }
}
