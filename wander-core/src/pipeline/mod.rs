//! The itinerary pipeline: probe, generate, extract, geocode, normalize.
//!
//! A request runs up to one whole-pipeline attempt per configured
//! temperature (0.7, 0.5, 0.3 by default). Each attempt retries the provider
//! call itself with linear backoff; a rejected credential ends the request at
//! once. The caller gets either a [`GeneratedItinerary`] or a
//! [`PipelineFailure`], never an empty itinerary.

mod config;
mod failure;
mod orchestrator;
mod probe;

pub use config::{PipelineConfig, DEFAULT_CITY, DEFAULT_DEADLINE, DEFAULT_TEMPERATURES};
pub use failure::{AttemptOutcome, AttemptRecord, FailureKind, PipelineError, PipelineFailure};
pub use orchestrator::{GeneratedItinerary, ItineraryPipeline};
pub use probe::{is_credential_error, is_retryable_provider_error, probe_credential};
