pub mod ai;
pub mod config;
pub mod error;
pub mod extract;
pub mod geocode;
pub mod normalize;
pub mod pipeline;
pub mod rate_limit;
pub mod retry;
pub mod storage;
pub mod types;

pub use error::{ExtractError, SchemaViolation};
pub use extract::{extract, extract_json, extract_tagged, ResponseFormat};
pub use geocode::{Geocoder, GeocodingStats, MockGeocoder, YandexGeocoder};
pub use normalize::{normalize_itinerary, Normalizer};
pub use pipeline::{
    GeneratedItinerary, ItineraryPipeline, PipelineConfig, PipelineError, PipelineFailure,
};
pub use retry::{with_retry, RetryPolicy};
pub use storage::{DiskRouteStore, MemoryRouteStore, RouteStore, StoreError};
pub use types::{
    Coordinates, Itinerary, ItineraryMetadata, ItineraryStage, RouteRequest, StageTips,
    Transition, FALLBACK_COORDINATES,
};
