//! Pipeline errors and the structured failure handed to callers.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::ai::AiError;
use crate::error::{ExtractError, SchemaViolation};

use super::probe::{is_credential_error, is_retryable_provider_error};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("The provider rejected the API credential: {0}")]
    InvalidCredential(String),

    #[error("Provider call failed: {0}")]
    Provider(AiError),

    #[error("Could not extract an itinerary: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Itinerary does not match the schema: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    #[error("All {attempts} attempts failed; last error: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<PipelineError>,
    },

    #[error("Request did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<AiError> for PipelineError {
    fn from(err: AiError) -> Self {
        if is_credential_error(&err) {
            PipelineError::InvalidCredential(err.to_string())
        } else {
            PipelineError::Provider(err)
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::InvalidCredential(_) => FailureKind::InvalidCredential,
            PipelineError::Provider(_) => FailureKind::Provider,
            PipelineError::Extraction(_) => FailureKind::Extraction,
            PipelineError::SchemaViolation(_) => FailureKind::SchemaViolation,
            PipelineError::Exhausted { .. } => FailureKind::Exhausted,
            PipelineError::DeadlineExceeded(_) => FailureKind::DeadlineExceeded,
        }
    }

    /// Whether another whole-pipeline attempt may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Provider(err) => is_retryable_provider_error(err),
            PipelineError::Extraction(_) | PipelineError::SchemaViolation(_) => true,
            PipelineError::InvalidCredential(_)
            | PipelineError::Exhausted { .. }
            | PipelineError::DeadlineExceeded(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidCredential,
    Provider,
    Extraction,
    SchemaViolation,
    Exhausted,
    DeadlineExceeded,
}

impl FailureKind {
    fn title(self) -> &'static str {
        match self {
            FailureKind::InvalidCredential => "Invalid API key",
            FailureKind::Provider => "Route service unavailable",
            FailureKind::Extraction => "Unreadable route description",
            FailureKind::SchemaViolation => "Incomplete route",
            FailureKind::Exhausted => "Could not generate a route",
            FailureKind::DeadlineExceeded => "Route generation timed out",
        }
    }

    fn suggestion(self) -> &'static str {
        match self {
            FailureKind::InvalidCredential => {
                "Check that WANDER_AI_API_KEY is set to a valid, unexpired key."
            }
            FailureKind::Provider => "The model provider may be overloaded. Try again in a minute.",
            FailureKind::Extraction | FailureKind::SchemaViolation | FailureKind::Exhausted => {
                "Try again, or simplify the request (fewer interests, shorter duration)."
            }
            FailureKind::DeadlineExceeded => {
                "Try again later, or raise WANDER_DEADLINE_SECS."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed,
}

/// One whole-pipeline attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub attempt: u32,
    pub temperature: f32,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl AttemptRecord {
    pub fn succeeded(attempt: u32, temperature: f32, duration_ms: u64) -> Self {
        Self {
            attempt,
            temperature,
            outcome: AttemptOutcome::Succeeded,
            error_kind: None,
            message: None,
            duration_ms,
        }
    }

    pub fn failed(attempt: u32, temperature: f32, error: &PipelineError, duration_ms: u64) -> Self {
        Self {
            attempt,
            temperature,
            outcome: AttemptOutcome::Failed,
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
            duration_ms,
        }
    }
}

/// What the caller gets when no itinerary could be produced.
///
/// Transport-agnostic: it carries no status codes.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{title}: {message}")]
pub struct PipelineFailure {
    pub kind: FailureKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub suggestion: String,
    pub attempts: Vec<AttemptRecord>,
}

impl PipelineFailure {
    pub fn new(error: &PipelineError, attempts: Vec<AttemptRecord>) -> Self {
        let kind = error.kind();

        // Exhausted failures are explained by what went wrong last
        let (details, suggestion) = match error {
            PipelineError::Exhausted { last, .. } => (
                Some(format!("last failure: {:?}", last.kind())),
                last.kind().suggestion(),
            ),
            _ => (None, kind.suggestion()),
        };

        Self {
            kind,
            title: kind.title().to_string(),
            message: error.to_string(),
            details,
            suggestion: suggestion.to_string(),
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_become_invalid_credential() {
        let err: PipelineError = AiError::Api("400: API_KEY_INVALID".to_string()).into();
        assert!(matches!(err, PipelineError::InvalidCredential(_)));
        assert!(!err.is_retryable());

        let err: PipelineError = AiError::Api("503 Service Unavailable".to_string()).into();
        assert!(matches!(err, PipelineError::Provider(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_offline_cache_miss_is_not_retryable() {
        let err: PipelineError = AiError::OfflineNotCached.into();
        assert_eq!(err.kind(), FailureKind::Provider);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_exhausted_failure_payload() {
        let err = PipelineError::Exhausted {
            attempts: 3,
            last: Box::new(SchemaViolation::EmptyStages.into()),
        };
        let failure = PipelineFailure::new(&err, vec![]);

        assert_eq!(failure.kind, FailureKind::Exhausted);
        assert_eq!(failure.title, "Could not generate a route");
        assert!(failure.message.contains("Itinerary has no stages"));
        let details = failure.details.as_deref();
        assert_eq!(details, Some("last failure: SchemaViolation"));
        assert!(failure.suggestion.contains("Try again"));
    }

    #[test]
    fn test_failure_serializes_camel_case() {
        let err = PipelineError::InvalidCredential("unauthorized".to_string());
        let failure = PipelineFailure::new(
            &err,
            vec![AttemptRecord::failed(1, 0.7, &err, 12)],
        );

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "invalid_credential");
        assert_eq!(json["attempts"][0]["errorKind"], "invalid_credential");
        assert_eq!(json["attempts"][0]["durationMs"], 12);
        assert!(json.get("details").is_none());
    }
}
