use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::ai::prompts::{
    render_itinerary_json_prompt, render_itinerary_tagged_prompt, ITINERARY_JSON_PROMPT_NAME,
    ITINERARY_SYSTEM_PROMPT, ITINERARY_TAGGED_PROMPT_NAME,
};
use crate::ai::{AiClient, AiError, ChatMessage, ChatRequest, ChatResponse};
use crate::error::ExtractError;
use crate::extract::{
    extract_json, split_sections, ResponseFormat, TaggedParser, TaggedRoute, TaggedStage,
};
use crate::geocode::{geocode_stage, Geocoder, GeocodingStats};
use crate::normalize::Normalizer;
use crate::retry::with_retry;
use crate::types::{Itinerary, RouteRequest};

use super::config::PipelineConfig;
use super::failure::{AttemptRecord, PipelineError, PipelineFailure};
use super::probe::{is_retryable_provider_error, probe_credential};

/// A successfully generated itinerary plus how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub itinerary: Itinerary,
    pub attempts: Vec<AttemptRecord>,
    pub geocoding: GeocodingStats,
}

pub struct ItineraryPipeline {
    ai: Arc<dyn AiClient>,
    geocoder: Option<Arc<dyn Geocoder>>,
    normalizer: Normalizer,
    config: PipelineConfig,
}

impl ItineraryPipeline {
    pub fn new(ai: Arc<dyn AiClient>, config: PipelineConfig) -> Self {
        Self {
            ai,
            geocoder: None,
            normalizer: Normalizer::new(config.fallback),
            config,
        }
    }

    /// Geocode tagged-format stages with this service. Without one, every
    /// tagged stage gets the fallback point.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate an itinerary for `request`.
    pub async fn generate(
        &self,
        request: &RouteRequest,
    ) -> Result<GeneratedItinerary, PipelineFailure> {
        let request_id = Uuid::new_v4();
        let mut attempts = Vec::new();

        let run = self.run_attempts(request, &mut attempts);
        let result = match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, run)
                .await
                .unwrap_or(Err(PipelineError::DeadlineExceeded(deadline))),
            None => run.await,
        };

        match result {
            Ok((itinerary, geocoding)) => {
                tracing::info!(
                    request_id = %request_id,
                    stages = itinerary.stages.len(),
                    attempts = attempts.len(),
                    resolved = geocoding.resolved,
                    "itinerary generated"
                );
                Ok(GeneratedItinerary {
                    request_id,
                    generated_at: Utc::now(),
                    itinerary,
                    attempts,
                    geocoding,
                })
            }
            Err(err) => {
                tracing::warn!(
                    request_id = %request_id,
                    kind = ?err.kind(),
                    error = %err,
                    "itinerary generation failed"
                );
                Err(PipelineFailure::new(&err, attempts))
            }
        }
    }

    async fn run_attempts(
        &self,
        request: &RouteRequest,
        attempts: &mut Vec<AttemptRecord>,
    ) -> Result<(Itinerary, GeocodingStats), PipelineError> {
        let schedule = self.config.temperature_schedule();
        let max_attempts = schedule.len() as u32;
        let mut last_error = None;

        for (attempt, &temperature) in (1..).zip(schedule) {
            let started = Instant::now();
            let span = tracing::info_span!("pipeline_attempt", attempt, temperature);
            let result = self.attempt(request, temperature).instrument(span).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    attempts.push(AttemptRecord::succeeded(attempt, temperature, duration_ms));
                    return Ok(output);
                }
                Err(err) => {
                    let record = AttemptRecord::failed(attempt, temperature, &err, duration_ms);
                    attempts.push(record);
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    tracing::warn!(attempt, max_attempts, error = %err, "pipeline attempt failed");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(last) => Err(PipelineError::Exhausted {
                attempts: max_attempts,
                last: Box::new(last),
            }),
            // The schedule is never empty
            None => Err(PipelineError::Exhausted {
                attempts: 0,
                last: Box::new(PipelineError::Provider(AiError::Api(
                    "no attempts were made".to_string(),
                ))),
            }),
        }
    }

    async fn attempt(
        &self,
        request: &RouteRequest,
        temperature: f32,
    ) -> Result<(Itinerary, GeocodingStats), PipelineError> {
        let format = self.config.format;

        if format == ResponseFormat::Json && self.config.probe_credential {
            probe_credential(self.ai.as_ref(), &self.config.provider_retry).await?;
        }

        let (prompt_name, chat_request) = self.chat_request(request, temperature);
        let response = self.generate_text(prompt_name, &chat_request).await?;

        let (raw, geocoding) = match format {
            ResponseFormat::Json => (extract_json(&response.content)?, GeocodingStats::default()),
            ResponseFormat::Tagged => self.extract_and_geocode(&response.content).await?,
        };
        let itinerary = self.normalizer.normalize(&raw)?;

        // Only replies that produced an itinerary may be replayed
        self.ai.commit(prompt_name, &chat_request, &response);
        Ok((itinerary, geocoding))
    }

    fn chat_request(
        &self,
        request: &RouteRequest,
        temperature: f32,
    ) -> (&'static str, ChatRequest) {
        let city = &self.config.city;
        let (prompt_name, prompt) = match self.config.format {
            ResponseFormat::Json => (
                ITINERARY_JSON_PROMPT_NAME,
                render_itinerary_json_prompt(request, city),
            ),
            ResponseFormat::Tagged => (
                ITINERARY_TAGGED_PROMPT_NAME,
                render_itinerary_tagged_prompt(request, city),
            ),
        };

        let chat_request = ChatRequest::new(vec![
            ChatMessage::system(ITINERARY_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_max_tokens(self.config.max_tokens)
        .with_temperature(temperature);

        match self.config.format {
            ResponseFormat::Json => (prompt_name, chat_request.json()),
            ResponseFormat::Tagged => (prompt_name, chat_request),
        }
    }

    /// Call the provider, retrying transient failures.
    async fn generate_text(
        &self,
        prompt_name: &str,
        chat_request: &ChatRequest,
    ) -> Result<ChatResponse, PipelineError> {
        let response = with_retry(
            &self.config.provider_retry,
            is_retryable_provider_error,
            || self.ai.complete(prompt_name, chat_request.clone()),
        )
        .await?;

        tracing::debug!(
            prompt_name,
            cached = response.cached,
            total_tokens = response.usage.total_tokens,
            "provider responded"
        );

        Ok(response)
    }

    /// Parse tagged text, geocoding each stage as soon as it is complete.
    async fn extract_and_geocode(
        &self,
        text: &str,
    ) -> Result<(Value, GeocodingStats), PipelineError> {
        let mut parser = TaggedParser::new();
        let mut stages = Vec::new();
        let mut stats = GeocodingStats::default();

        for section in split_sections(text) {
            if let Some(stage) = parser.feed(&section) {
                stages.push(self.locate(stage, &mut stats).await);
            }
        }
        if let Some(stage) = parser.finish() {
            stages.push(self.locate(stage, &mut stats).await);
        }

        if stages.is_empty() {
            return Err(ExtractError::NoTaggedStages.into());
        }

        let route = TaggedRoute {
            overview: parser.overview().map(str::to_string),
            stages,
        };
        Ok((route.to_raw(), stats))
    }

    async fn locate(&self, mut stage: TaggedStage, stats: &mut GeocodingStats) -> TaggedStage {
        if let Some(geocoder) = &self.geocoder {
            geocode_stage(geocoder.as_ref(), &self.config.city, &mut stage, stats).await;
        }
        stage
    }
}
