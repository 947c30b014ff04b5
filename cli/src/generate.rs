use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use wander_core::ai::OpenAiCompatClient;
use wander_core::geocode::{GeocoderConfig, YandexGeocoder};
use wander_core::{
    DiskRouteStore, ItineraryPipeline, PipelineConfig, ResponseFormat, RouteRequest, RouteStore,
};

#[derive(Args)]
pub struct GenerateArgs {
    /// How long the walk should take, e.g. "3 hours"
    #[arg(long)]
    duration: String,

    /// Interest to plan around (repeatable)
    #[arg(long = "interest")]
    interests: Vec<String>,

    /// Where the walk starts
    #[arg(long = "start")]
    start_point: Option<String>,

    /// Walking pace, e.g. "slow"
    #[arg(long)]
    pace: Option<String>,

    /// Budget, e.g. "2000 RUB"
    #[arg(long)]
    budget: Option<String>,

    /// Anything else the model should know
    #[arg(long)]
    notes: Option<String>,

    /// Response format to request: json or tagged (default: $WANDER_RESPONSE_FORMAT or json)
    #[arg(long)]
    format: Option<ResponseFormat>,

    /// City to plan in (default: $WANDER_CITY or Moscow)
    #[arg(long)]
    city: Option<String>,

    /// Save the itinerary under this key
    #[arg(long)]
    save: Option<String>,
}

/// Run the pipeline and print the result. Returns false if generation failed.
pub async fn run(args: GenerateArgs, store: &DiskRouteStore) -> Result<bool> {
    let ai = OpenAiCompatClient::from_env().context("Failed to configure AI client")?;

    let mut config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(city) = args.city {
        config.city = city;
    }

    let mut pipeline = ItineraryPipeline::new(Arc::new(ai), config);

    match GeocoderConfig::from_env().context("Invalid geocoder configuration")? {
        Some(geocoder_config) => {
            let geocoder =
                YandexGeocoder::new(geocoder_config).context("Failed to create geocoder")?;
            pipeline = pipeline.with_geocoder(Arc::new(geocoder));
        }
        None => {
            tracing::info!(
                "WANDER_GEOCODER_API_KEY not set; tagged stages will use fallback coordinates"
            );
        }
    }

    let request = RouteRequest {
        duration: args.duration,
        interests: args.interests,
        start_point: args.start_point,
        pace: args.pace,
        budget: args.budget,
        notes: args.notes,
    };

    match pipeline.generate(&request).await {
        Ok(generated) => {
            if let Some(key) = &args.save {
                store
                    .save_itinerary(key, &generated.itinerary)
                    .with_context(|| format!("Failed to save route {:?}", key))?;
                tracing::info!(key = %key, dir = %store.routes_dir().display(), "route saved");
            }
            println!("{}", serde_json::to_string_pretty(&generated)?);
            Ok(true)
        }
        Err(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Ok(false)
        }
    }
}
