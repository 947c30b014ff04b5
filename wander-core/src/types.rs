use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in degrees.
///
/// Serialized as a two-element array `[lat, lon]`, the same shape the
/// normalizer accepts, so a canonical itinerary round-trips unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components finite and inside the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lon]
    }
}

/// Moscow city centre, substituted whenever a stage has no usable location.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates::new(55.755826, 37.6173);

/// How to get from the previous stage to this one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub walking_description: String,
    pub transit_description: String,
    pub duration: String,
    pub distance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTips {
    pub weather: String,
    pub crowding: String,
    pub cost: String,
    /// Free-form advice that doesn't fit the other buckets.
    pub general: String,
}

/// One stop on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryStage {
    pub name: String,
    #[serde(rename = "type")]
    pub stage_type: String,
    pub description: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub visit_time: String,
    pub facts: Vec<String>,
    pub photo_spots: Vec<String>,
    pub activities: Vec<String>,
    pub transition_from_previous: Transition,
    pub tips: StageTips,
}

/// Route-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryMetadata {
    pub total_time: String,
    pub total_distance: String,
    pub budget_estimate: String,
    pub best_for: Vec<String>,
    pub safety_tips: Vec<String>,
    pub overview: String,
}

/// A complete walking route. `stages` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub stages: Vec<ItineraryStage>,
    pub metadata: ItineraryMetadata,
}

/// What the user asked for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// e.g. "3 hours"
    pub duration: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
