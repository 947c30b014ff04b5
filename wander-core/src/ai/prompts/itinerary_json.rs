//! Itinerary prompt for the JSON response format.

use crate::types::RouteRequest;

/// Prompt name for cache keys.
pub const ITINERARY_JSON_PROMPT_NAME: &str = "itinerary_json";

/// Render the JSON itinerary prompt.
pub fn render_itinerary_json_prompt(request: &RouteRequest, city: &str) -> String {
    let details = super::render_request_details(request, city);

    format!(
        r#"Plan a walking route with these wishes:
{details}

Respond with a single JSON object only, no other text, in exactly this shape:
{{
  "stages": [
    {{
      "name": "Place name",
      "type": "museum | park | cafe | landmark | street | place",
      "description": "What the place is and why it is worth a visit",
      "address": "Street address",
      "coordinates": [55.7539, 37.6208],
      "visitTime": "40 minutes",
      "facts": ["Short interesting fact"],
      "photoSpots": ["Where to take the best photo"],
      "activities": ["What to do there"],
      "transitionFromPrevious": {{
        "walkingDescription": "How to walk here from the previous stop",
        "transitDescription": "Public transport alternative, if any",
        "duration": "10 minutes",
        "distance": "800 m"
      }},
      "tips": {{
        "weather": "",
        "crowding": "",
        "cost": "",
        "general": ""
      }}
    }}
  ],
  "metadata": {{
    "totalTime": "3 hours",
    "totalDistance": "4 km",
    "budgetEstimate": "1500 RUB",
    "bestFor": ["first-time visitors"],
    "safetyTips": ["Keep an eye on your belongings"],
    "overview": "One or two sentences about the whole route"
  }}
}}

Coordinates are [latitude, longitude]. The first stage has an empty transitionFromPrevious."#,
        details = details
    )
}
