//! Minimal prompt used to check that the provider accepts our credential.

/// Prompt name for cache keys.
pub const CREDENTIAL_PROBE_PROMPT_NAME: &str = "credential_probe";

pub fn render_credential_probe_prompt() -> &'static str {
    "Reply with the single word: ok"
}
