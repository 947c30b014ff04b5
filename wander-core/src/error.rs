use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("No JSON object found in model response")]
    NoJsonObject,

    #[error("Invalid JSON in model response: {0}")]
    InvalidJson(String),

    #[error("No numbered stages found in tagged model response")]
    NoTaggedStages,
}

/// The raw structure cannot become an itinerary at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    #[error("Itinerary must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: stages")]
    MissingStages,

    #[error("Field 'stages' must be an array")]
    StagesNotArray,

    #[error("Itinerary has no stages")]
    EmptyStages,
}
