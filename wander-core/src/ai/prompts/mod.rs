//! AI prompt templates.

pub mod credential_probe;
pub mod itinerary_json;
pub mod itinerary_tagged;

pub use credential_probe::{render_credential_probe_prompt, CREDENTIAL_PROBE_PROMPT_NAME};
pub use itinerary_json::{render_itinerary_json_prompt, ITINERARY_JSON_PROMPT_NAME};
pub use itinerary_tagged::{render_itinerary_tagged_prompt, ITINERARY_TAGGED_PROMPT_NAME};

use crate::types::RouteRequest;

/// System prompt shared by both itinerary formats.
pub const ITINERARY_SYSTEM_PROMPT: &str = "You are an experienced local guide who plans \
walking routes. Only suggest real places that can be reached on foot, in a sensible order.";

/// The user's wishes as a bullet list, shared by both itinerary prompts.
fn render_request_details(request: &RouteRequest, city: &str) -> String {
    let mut lines = vec![
        format!("- City: {}", city),
        format!("- Duration: {}", request.duration),
    ];

    if !request.interests.is_empty() {
        lines.push(format!("- Interests: {}", request.interests.join(", ")));
    }
    if let Some(start) = &request.start_point {
        lines.push(format!("- Start point: {}", start));
    }
    if let Some(pace) = &request.pace {
        lines.push(format!("- Pace: {}", pace));
    }
    if let Some(budget) = &request.budget {
        lines.push(format!("- Budget: {}", budget));
    }
    if let Some(notes) = &request.notes {
        lines.push(format!("- Notes: {}", notes));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_details_skip_absent_fields() {
        let request = RouteRequest {
            duration: "2 hours".to_string(),
            interests: vec!["history".to_string(), "coffee".to_string()],
            pace: Some("slow".to_string()),
            ..Default::default()
        };

        let details = render_request_details(&request, "Moscow");
        assert!(details.contains("- City: Moscow"));
        assert!(details.contains("- Interests: history, coffee"));
        assert!(details.contains("- Pace: slow"));
        assert!(!details.contains("Budget"));
        assert!(!details.contains("Start point"));
    }
}
