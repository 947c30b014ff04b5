//! Credential probe: a tiny generation call made before the real one.

use crate::ai::prompts::{render_credential_probe_prompt, CREDENTIAL_PROBE_PROMPT_NAME};
use crate::ai::{AiClient, AiError, ChatMessage, ChatRequest};
use crate::retry::{with_retry, RetryPolicy};

use super::failure::PipelineError;

/// Lowercase fragments of provider messages that mean the key is unusable.
const CREDENTIAL_ERROR_MARKERS: &[&str] = &[
    "api_key_invalid",
    "api key expired",
    "api key not valid",
    "key expired",
    "key invalid",
    "invalid api key",
    "incorrect api key",
    "unauthorized",
    "authentication",
];

/// Whether a provider error means the credential itself was rejected.
pub fn is_credential_error(error: &AiError) -> bool {
    let message = error.to_string().to_lowercase();
    CREDENTIAL_ERROR_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Whether calling the provider again may succeed. Rejected credentials,
/// offline cache misses and bad configuration never recover on their own.
pub fn is_retryable_provider_error(error: &AiError) -> bool {
    match error {
        AiError::Api(_) => !is_credential_error(error),
        AiError::OfflineNotCached | AiError::Config(_) => false,
    }
}

/// Check the credential with a minimal request.
///
/// Credential errors fail at once; transient errors are retried per `policy`.
pub async fn probe_credential(
    client: &dyn AiClient,
    policy: &RetryPolicy,
) -> Result<(), PipelineError> {
    let request = ChatRequest::new(vec![ChatMessage::user(render_credential_probe_prompt())])
        .with_max_tokens(5)
        .with_temperature(0.0)
        .uncached();

    with_retry(
        policy,
        is_retryable_provider_error,
        || client.complete(CREDENTIAL_PROBE_PROMPT_NAME, request.clone()),
    )
    .await?;

    tracing::debug!(model = client.model_name(), "credential probe succeeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{FakeAiClient, FakeReply};
    use std::time::Duration;

    #[test]
    fn test_credential_markers_case_insensitive() {
        for message in [
            "Error 400: API_KEY_INVALID",
            "API key expired. Please renew the API key.",
            "401 Unauthorized",
            "Incorrect API key provided: sk-...",
            "Authentication failed",
        ] {
            assert!(
                is_credential_error(&AiError::Api(message.to_string())),
                "{}",
                message
            );
        }

        let throttled = AiError::Api("429 Too Many Requests".to_string());
        assert!(!is_credential_error(&throttled));
        assert!(!is_credential_error(&AiError::OfflineNotCached));
    }

    #[test]
    fn test_only_transient_errors_are_retryable() {
        let transient = AiError::Api("503 Service Unavailable".to_string());
        let rejected = AiError::Api("401 Unauthorized".to_string());

        assert!(is_retryable_provider_error(&transient));
        assert!(!is_retryable_provider_error(&rejected));
        assert!(!is_retryable_provider_error(&AiError::OfflineNotCached));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_key_fails_without_retry() {
        let client = FakeAiClient::new().with_script(
            CREDENTIAL_PROBE_PROMPT_NAME,
            vec![FakeReply::error("API_KEY_INVALID"), FakeReply::text("ok")],
        );

        let result = probe_credential(&client, &RetryPolicy::default()).await;

        assert!(matches!(result, Err(PipelineError::InvalidCredential(_))));
        assert_eq!(client.calls_for(CREDENTIAL_PROBE_PROMPT_NAME).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_is_retried() {
        let client = FakeAiClient::new().with_script(
            CREDENTIAL_PROBE_PROMPT_NAME,
            vec![
                FakeReply::error("503 Service Unavailable"),
                FakeReply::text("ok"),
            ],
        );

        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        probe_credential(&client, &policy).await.unwrap();

        let calls = client.calls_for(CREDENTIAL_PROBE_PROMPT_NAME);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].temperature, Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_probe_is_provider_error() {
        let client = FakeAiClient::new();
        let policy = RetryPolicy::new(2, Duration::from_millis(10));

        let result = probe_credential(&client, &policy).await;
        assert!(matches!(result, Err(PipelineError::Provider(_))));
        assert_eq!(client.calls().len(), 2);
    }
}
