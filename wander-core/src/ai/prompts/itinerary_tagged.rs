//! Itinerary prompt for the emoji-tagged text format.

use crate::extract::tagged::{
    DESCRIPTION_MARKER, DURATION_MARKER, OVERVIEW_MARKER, TIP_MARKER, TRANSITION_MARKER,
};
use crate::types::RouteRequest;

/// Prompt name for cache keys.
pub const ITINERARY_TAGGED_PROMPT_NAME: &str = "itinerary_tagged";

/// Render the tagged itinerary prompt. The markers are the ones the tagged
/// extractor recognizes.
pub fn render_itinerary_tagged_prompt(request: &RouteRequest, city: &str) -> String {
    let details = super::render_request_details(request, city);

    format!(
        r#"Plan a walking route with these wishes:
{details}

Answer in plain text using exactly this layout. Separate sections with one blank line.

{overview} Overview: one or two sentences about the whole route

1. Name of the first place
{duration} Time: how long to stay
{description} Description: what the place is
• Something to do there (at most three bullets)
{tip} Tip: a practical tip
{transition} Transition: how to walk here from the previous stop

2. Name of the next place
...

Use the real name of each place on the numbered line, without any other text."#,
        details = details,
        overview = OVERVIEW_MARKER,
        duration = DURATION_MARKER,
        description = DESCRIPTION_MARKER,
        tip = TIP_MARKER,
        transition = TRANSITION_MARKER,
    )
}
