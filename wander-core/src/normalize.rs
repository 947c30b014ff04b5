//! Canonicalization of raw itinerary JSON.
//!
//! Every optional field is defaulted on its own, so one malformed field never
//! costs a whole stage. Only a missing or empty `stages` list is fatal.

use serde_json::{Map, Value};

use crate::error::SchemaViolation;
use crate::types::{
    Coordinates, Itinerary, ItineraryMetadata, ItineraryStage, StageTips, Transition,
    FALLBACK_COORDINATES,
};

pub const DEFAULT_STAGE_TYPE: &str = "place";
pub const DEFAULT_VISIT_TIME: &str = "30 minutes";
pub const NOT_SPECIFIED: &str = "not specified";

/// Turns raw itinerary-shaped JSON into a canonical [`Itinerary`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    fallback: Coordinates,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(FALLBACK_COORDINATES)
    }
}

impl Normalizer {
    /// Use `fallback` for stages without usable coordinates.
    pub fn new(fallback: Coordinates) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Coordinates {
        self.fallback
    }

    pub fn normalize(&self, raw: &Value) -> Result<Itinerary, SchemaViolation> {
        let root = raw.as_object().ok_or(SchemaViolation::NotAnObject)?;

        let stages = match root.get("stages") {
            None | Some(Value::Null) => return Err(SchemaViolation::MissingStages),
            Some(Value::Array(stages)) => stages,
            Some(_) => return Err(SchemaViolation::StagesNotArray),
        };
        if stages.is_empty() {
            return Err(SchemaViolation::EmptyStages);
        }

        let stages = stages
            .iter()
            .enumerate()
            .map(|(i, stage)| self.stage(i + 1, stage))
            .collect();

        Ok(Itinerary {
            stages,
            metadata: metadata(root.get("metadata")),
        })
    }

    fn stage(&self, position: usize, raw: &Value) -> ItineraryStage {
        let empty = Map::new();
        let obj = raw.as_object().unwrap_or(&empty);

        ItineraryStage {
            name: text_or(obj.get("name"), &format!("Point {}", position)),
            stage_type: text_or(obj.get("type"), DEFAULT_STAGE_TYPE),
            description: text_or(obj.get("description"), ""),
            address: text_or(obj.get("address"), ""),
            coordinates: coordinates(obj.get("coordinates")).unwrap_or(self.fallback),
            visit_time: text_or(obj.get("visitTime"), DEFAULT_VISIT_TIME),
            facts: string_list(obj.get("facts")),
            photo_spots: string_list(obj.get("photoSpots")),
            activities: string_list(obj.get("activities")),
            transition_from_previous: transition(obj.get("transitionFromPrevious")),
            tips: tips(obj.get("tips")),
        }
    }
}

/// Normalize with the default fallback point.
pub fn normalize_itinerary(raw: &Value) -> Result<Itinerary, SchemaViolation> {
    Normalizer::default().normalize(raw)
}

/// The string value, or `default` when missing, not a string, or blank.
fn text_or(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// String elements of an array; anything else becomes empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts `[lat, lon]` or `{"lat": .., "lon"|"lng": ..}`.
fn coordinates(value: Option<&Value>) -> Option<Coordinates> {
    let (lat, lon) = match value? {
        Value::Array(pair) if pair.len() == 2 => (pair[0].as_f64()?, pair[1].as_f64()?),
        Value::Object(obj) => {
            let lat = obj.get("lat").and_then(Value::as_f64)?;
            let lon = obj
                .get("lon")
                .or_else(|| obj.get("lng"))
                .and_then(Value::as_f64)?;
            (lat, lon)
        }
        _ => return None,
    };

    Some(Coordinates::new(lat, lon)).filter(Coordinates::is_valid)
}

fn transition(value: Option<&Value>) -> Transition {
    let empty = Map::new();
    let obj = value.and_then(Value::as_object).unwrap_or(&empty);

    Transition {
        walking_description: text_or(obj.get("walkingDescription"), ""),
        transit_description: text_or(obj.get("transitDescription"), ""),
        duration: text_or(obj.get("duration"), ""),
        distance: text_or(obj.get("distance"), ""),
    }
}

fn tips(value: Option<&Value>) -> StageTips {
    match value {
        Some(Value::Object(obj)) => StageTips {
            weather: text_or(obj.get("weather"), ""),
            crowding: text_or(obj.get("crowding"), ""),
            cost: text_or(obj.get("cost"), ""),
            general: text_or(obj.get("general"), ""),
        },
        // Tagged output carries tips as a plain list
        Some(list @ Value::Array(_)) => {
            let tips: Vec<_> = string_list(Some(list))
                .into_iter()
                .filter(|tip| !tip.trim().is_empty())
                .collect();
            StageTips {
                general: tips.join("\n"),
                ..Default::default()
            }
        }
        text @ Some(Value::String(_)) => StageTips {
            general: text_or(text, ""),
            ..Default::default()
        },
        _ => StageTips::default(),
    }
}

fn metadata(value: Option<&Value>) -> ItineraryMetadata {
    let empty = Map::new();
    let obj = value.and_then(Value::as_object).unwrap_or(&empty);

    ItineraryMetadata {
        total_time: text_or(obj.get("totalTime"), NOT_SPECIFIED),
        total_distance: text_or(obj.get("totalDistance"), NOT_SPECIFIED),
        budget_estimate: text_or(obj.get("budgetEstimate"), NOT_SPECIFIED),
        best_for: string_list(obj.get("bestFor")),
        safety_tips: string_list(obj.get("safetyTips")),
        overview: text_or(obj.get("overview"), ""),
    }
}
