//! Sequential, best-effort coordinate lookup for tagged stages.

use serde::{Deserialize, Serialize};

use super::Geocoder;
use crate::extract::TaggedStage;
use crate::types::Coordinates;

/// Per-request geocoding counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodingStats {
    pub resolved: u32,
    /// Nothing matched, or the match was not a valid point.
    pub missed: u32,
    pub failed: u32,
}

/// Look up one stage and set its coordinates if found.
///
/// Misses and errors leave the stage without coordinates; the normalizer
/// substitutes the fallback point later.
pub async fn geocode_stage(
    geocoder: &dyn Geocoder,
    city: &str,
    stage: &mut TaggedStage,
    stats: &mut GeocodingStats,
) {
    if stage.name.is_empty() {
        stats.missed += 1;
        return;
    }

    let query = if city.is_empty() {
        stage.name.clone()
    } else {
        format!("{}, {}", city, stage.name)
    };

    match geocoder.lookup(&query).await {
        Ok(Some((lon, lat))) => {
            let coordinates = Coordinates::new(lat, lon);
            if coordinates.is_valid() {
                stage.coordinates = Some(coordinates);
                stats.resolved += 1;
            } else {
                tracing::warn!(query = %query, lat, lon, "geocoder returned an invalid point");
                stats.missed += 1;
            }
        }
        Ok(None) => {
            tracing::warn!(query = %query, "geocoding miss; stage will use fallback coordinates");
            stats.missed += 1;
        }
        Err(e) => {
            tracing::warn!(
                query = %query,
                error = %e,
                "geocoding failed; stage will use fallback coordinates"
            );
            stats.failed += 1;
        }
    }
}

/// Geocode stages one at a time, in order.
pub async fn enrich_stages(
    geocoder: &dyn Geocoder,
    city: &str,
    stages: &mut [TaggedStage],
) -> GeocodingStats {
    let mut stats = GeocodingStats::default();
    for stage in stages.iter_mut() {
        geocode_stage(geocoder, city, stage, &mut stats).await;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_tagged;
    use crate::geocode::MockGeocoder;

    #[tokio::test]
    async fn test_reverses_provider_order_and_keeps_stage_order() {
        let geocoder = MockGeocoder::new()
            .with_place("Moscow, Red Square", 37.6208, 55.7539)
            .with_place("Moscow, Zaryadye Park", 37.6290, 55.7510);

        let mut route = extract_tagged("1. Red Square\n\n2. Unknown Place\n\n3. Zaryadye Park");
        let stats = enrich_stages(&geocoder, "Moscow", &mut route.stages).await;

        assert_eq!(
            route.stages[0].coordinates,
            Some(Coordinates::new(55.7539, 37.6208))
        );
        assert_eq!(route.stages[1].coordinates, None);
        assert_eq!(
            route.stages[2].coordinates,
            Some(Coordinates::new(55.7510, 37.6290))
        );
        assert_eq!(
            stats,
            GeocodingStats {
                resolved: 2,
                missed: 1,
                failed: 0
            }
        );
        assert_eq!(
            geocoder.queries(),
            vec![
                "Moscow, Red Square",
                "Moscow, Unknown Place",
                "Moscow, Zaryadye Park"
            ]
        );
    }

    #[tokio::test]
    async fn test_errors_are_absorbed() {
        let geocoder = MockGeocoder::new().with_error("Moscow, Arbat", "connection reset");
        let mut route = extract_tagged("1. Arbat");

        let stats = enrich_stages(&geocoder, "Moscow", &mut route.stages).await;
        assert_eq!(route.stages[0].coordinates, None);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_point_is_a_miss() {
        // Provider answered with the pair already swapped the wrong way
        let geocoder = MockGeocoder::new().with_place("Arbat", 55.75, 137.59);
        let mut route = extract_tagged("1. Arbat");

        let stats = enrich_stages(&geocoder, "", &mut route.stages).await;
        assert_eq!(route.stages[0].coordinates, None);
        assert_eq!(stats.missed, 1);
    }
}
