//! Golden file tests for itinerary extraction and normalization.
//!
//! Each JSON file in `fixtures/` names a captured provider response and the
//! itinerary it should turn into.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use wander_core::{extract, normalize_itinerary, ResponseFormat, FALLBACK_COORDINATES};

/// A test case loaded from a JSON fixture file
#[derive(Debug, Deserialize)]
struct TestCase {
    format: ResponseFormat,
    /// Path to the provider response (relative to the crate root)
    response_fixture_path: String,
    expected: ExpectedItinerary,
}

#[derive(Debug, Deserialize)]
struct ExpectedItinerary {
    stage_names: Vec<String>,
    visit_times: Vec<String>,
    /// Indices of stages that should sit on the fallback point
    #[serde(default)]
    fallback_stages: Vec<usize>,
    total_time: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    activity_counts: Option<Vec<usize>>,
}

/// Load all test cases from the fixtures directory
fn load_test_cases() -> Vec<(String, TestCase)> {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    let mut cases = Vec::new();

    for entry in fs::read_dir(&fixtures_dir).expect("Failed to read fixtures directory") {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.extension().map(|e| e == "json").unwrap_or(false) {
            let name = path.file_stem().unwrap().to_string_lossy().into_owned();
            let content = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
            let case: TestCase = serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
            cases.push((name, case));
        }
    }

    assert!(
        !cases.is_empty(),
        "No test fixtures found in {:?}",
        fixtures_dir
    );
    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

#[test]
fn test_itinerary_golden_files() {
    for (name, case) in load_test_cases() {
        println!("Testing: {}", name);

        let response_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(&case.response_fixture_path);
        let text = fs::read_to_string(&response_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read response fixture {}: {}",
                response_path.display(),
                e
            )
        });

        let raw = extract(case.format, &text)
            .unwrap_or_else(|e| panic!("Extraction failed for {}: {}", name, e));
        let itinerary = normalize_itinerary(&raw)
            .unwrap_or_else(|e| panic!("Normalization failed for {}: {}", name, e));

        let names: Vec<&str> = itinerary.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names, case.expected.stage_names,
            "Stage names mismatch for {}",
            name
        );

        let visit_times: Vec<&str> = itinerary
            .stages
            .iter()
            .map(|s| s.visit_time.as_str())
            .collect();
        assert_eq!(
            visit_times, case.expected.visit_times,
            "Visit times mismatch for {}",
            name
        );

        for (index, stage) in itinerary.stages.iter().enumerate() {
            let expect_fallback = case.expected.fallback_stages.contains(&index);
            assert_eq!(
                stage.coordinates == FALLBACK_COORDINATES,
                expect_fallback,
                "Coordinates of stage {} in {}: {:?}",
                index,
                name,
                stage.coordinates
            );
            assert!(stage.coordinates.is_valid());
            assert!(!stage.name.is_empty());
        }

        assert_eq!(
            itinerary.metadata.total_time, case.expected.total_time,
            "Total time mismatch for {}",
            name
        );

        if let Some(overview) = &case.expected.overview {
            assert_eq!(
                &itinerary.metadata.overview, overview,
                "Overview mismatch for {}",
                name
            );
        }

        if let Some(counts) = &case.expected.activity_counts {
            let actual: Vec<usize> = itinerary
                .stages
                .iter()
                .map(|s| s.activities.len())
                .collect();
            assert_eq!(&actual, counts, "Activity counts mismatch for {}", name);
        }

        // Normalizing the canonical record again must not change it
        let canonical = serde_json::to_value(&itinerary).unwrap();
        assert_eq!(
            normalize_itinerary(&canonical).unwrap(),
            itinerary,
            "Normalization is not a fixed point for {}",
            name
        );
    }
}
