//! Tests for location-potential scoring and grid scanning

use petaloka::error::AnalysisError;
use petaloka::potential::{
    calculate_location_potential, find_potential_locations, generate_grid_points, GridScanConfig,
    PotentialConfig, PotentialRating,
};
use petaloka::synthetic::SyntheticScenario;
use petaloka::{BoundingBox, GeoPoint, TargetLocation};

/// Degrees of latitude spanning `km` kilometers under the R = 6371 haversine.
fn lat_degrees(km: f64) -> f64 {
    km / (6371.0 * std::f64::consts::PI / 180.0)
}

fn place(id: &str, category: &str, lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(id, format!("Place {id}"), category, lat, lon)
}

/// Businesses due north of the origin at the given distances.
fn businesses_at(distances_km: &[f64]) -> Vec<GeoPoint> {
    distances_km
        .iter()
        .enumerate()
        .map(|(i, km)| place(&format!("b{i}"), "Kuliner", lat_degrees(*km), 0.0))
        .collect()
}

#[test]
fn test_competitor_component_sweet_spot() {
    let origin = TargetLocation::new(0.0, 0.0);
    let config = PotentialConfig::default();

    // No attractions or training sites: only the competitor component
    // (weight 0.3) contributes.
    let cases: [(&[f64], f64, f64); 4] = [
        // 0 competitors: unproven demand floor of 0.3
        (&[], 9.0, 30.0),
        // 2 of optimal 3: 0.7 + (2/3)*0.3 = 0.9
        (&[0.1, 0.2], 27.0, 90.0),
        // 5 competitors, 2 over optimum: 1.0 - 0.2 = 0.8
        (&[0.1, 0.2, 0.3, 0.4, 0.5], 24.0, 80.0),
        // 12 competitors: floored at 0.2
        (
            &[0.1, 0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5, 0.55, 0.6, 0.65],
            6.0,
            20.0,
        ),
    ];

    for (distances, expected_total, expected_component) in cases {
        let result =
            calculate_location_potential(&origin, &businesses_at(distances), &[], &[], &config)
                .unwrap();
        assert_eq!(result.score, expected_total);
        assert_eq!(result.details.competitors.score, expected_component);
        assert_eq!(result.details.competitors.count, distances.len());
    }
}

#[test]
fn test_perfect_location_scores_one_hundred() {
    let origin = TargetLocation::new(0.0, 0.0);

    // Three competitors (the sweet spot) plus attractions and training
    // sites directly at the candidate point.
    let businesses = businesses_at(&[0.1, 0.2, 0.3]);
    let attractions: Vec<GeoPoint> = (0..5)
        .map(|i| place(&format!("w{i}"), "park", 0.0, 0.0))
        .collect();
    let training: Vec<GeoPoint> = (0..3)
        .map(|i| place(&format!("p{i}"), "training", 0.0, 0.0))
        .collect();

    let result = calculate_location_potential(
        &origin,
        &businesses,
        &attractions,
        &training,
        &PotentialConfig::default(),
    )
    .unwrap();

    assert_eq!(result.score, 100.0);
    assert_eq!(result.rating, PotentialRating::SangatPotensial);
    assert_eq!(result.details.wisata.score, 100.0);
    assert_eq!(result.details.pelatihan.score, 100.0);
    assert_eq!(result.details.wisata.nearest.len(), 3);
}

#[test]
fn test_missing_collections_count_as_distant() {
    let origin = TargetLocation::new(0.0, 0.0);
    let result =
        calculate_location_potential(&origin, &[], &[], &[], &PotentialConfig::default()).unwrap();

    // avg distance defaults to twice the radius, so proximity scores are 0
    assert_eq!(result.details.wisata.avg_distance, 2.0);
    assert_eq!(result.details.wisata.score, 0.0);
    assert_eq!(result.details.pelatihan.score, 0.0);
    assert_eq!(result.rating, PotentialRating::KurangPotensial);
}

#[test]
fn test_score_stays_in_range_on_synthetic_data() {
    let dataset = SyntheticScenario::default().generate();
    let origin = TargetLocation::new(-6.9147, 107.6098);

    let result = calculate_location_potential(
        &origin,
        &dataset.businesses,
        &dataset.attractions,
        &dataset.training_sites,
        &PotentialConfig::default(),
    )
    .unwrap();

    assert!(result.score >= 0.0 && result.score <= 100.0);
    assert_eq!(
        result.recommendation.is_empty(),
        false,
        "every rating carries a recommendation"
    );
}

#[test]
fn test_invalid_radius_is_rejected() {
    let origin = TargetLocation::new(0.0, 0.0);
    let config = PotentialConfig {
        search_radius_km: 0.0,
        ..PotentialConfig::default()
    };
    let err = calculate_location_potential(&origin, &[], &[], &[], &config).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRadius(_)));
}

#[test]
fn test_grid_points_one_degree_lattice() {
    let bounds = BoundingBox {
        north: 1.0,
        south: 0.0,
        east: 1.0,
        west: 0.0,
    };

    // 111 km spacing is one degree of latitude; the longitude step is
    // slightly wider than the box, leaving a single column.
    let points = generate_grid_points(&bounds, 111.0).unwrap();
    assert_eq!(points.len(), 2);

    assert_eq!(points[0].lat, 0.0);
    assert_eq!(points[0].lng, 0.0);
    assert_eq!(points[0].name.as_deref(), Some("Point 1"));
    assert_eq!(points[1].lat, 1.0);
    assert_eq!(points[1].lng, 0.0);
    assert_eq!(points[1].name.as_deref(), Some("Point 2"));
}

#[test]
fn test_grid_points_rounded_to_five_decimals() {
    let bounds = BoundingBox {
        north: 0.1,
        south: 0.0,
        east: 0.1,
        west: 0.0,
    };
    let points = generate_grid_points(&bounds, 3.7).unwrap();
    assert!(!points.is_empty());
    for point in &points {
        assert_eq!(point.lat, (point.lat * 100_000.0).round() / 100_000.0);
        assert_eq!(point.lng, (point.lng * 100_000.0).round() / 100_000.0);
    }
}

#[test]
fn test_grid_rejects_invalid_parameters() {
    let inverted = BoundingBox {
        north: 0.0,
        south: 1.0,
        east: 1.0,
        west: 0.0,
    };
    assert!(matches!(
        generate_grid_points(&inverted, 1.0).unwrap_err(),
        AnalysisError::InvalidBounds { .. }
    ));

    let bounds = BoundingBox {
        north: 1.0,
        south: 0.0,
        east: 1.0,
        west: 0.0,
    };
    assert!(matches!(
        generate_grid_points(&bounds, 0.0).unwrap_err(),
        AnalysisError::InvalidGridSpacing(_)
    ));
}

#[test]
fn test_find_potential_locations_empty_data() {
    let config = GridScanConfig::default();
    let ranked = find_potential_locations(&[], &[], &[], &config).unwrap();
    assert!(ranked.is_empty());
}

#[test]
fn test_find_potential_locations_ranked_and_truncated() {
    let dataset = SyntheticScenario::default().generate();
    let config = GridScanConfig {
        grid_size_km: 1.0,
        top_n: 5,
        min_score: 0.0,
        ..GridScanConfig::default()
    };

    let ranked = find_potential_locations(
        &dataset.businesses,
        &dataset.attractions,
        &dataset.training_sites,
        &config,
    )
    .unwrap();

    assert!(!ranked.is_empty());
    assert!(ranked.len() <= 5);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for location in &ranked {
        assert!(location.score >= 0.0 && location.score <= 100.0);
    }
}

#[test]
fn test_find_potential_locations_respects_min_score() {
    let dataset = SyntheticScenario::default().generate();
    let config = GridScanConfig {
        grid_size_km: 1.0,
        min_score: 99.9,
        ..GridScanConfig::default()
    };

    let ranked = find_potential_locations(
        &dataset.businesses,
        &dataset.attractions,
        &dataset.training_sites,
        &config,
    )
    .unwrap();

    for location in &ranked {
        assert!(location.score >= 99.9);
    }
}

#[test]
fn test_explicit_bounds_are_used() {
    let bounds = BoundingBox {
        north: 0.01,
        south: 0.0,
        east: 0.01,
        west: 0.0,
    };
    let config = GridScanConfig {
        bounds: Some(bounds),
        grid_size_km: 0.5,
        min_score: 0.0,
        top_n: 1000,
        ..GridScanConfig::default()
    };

    let businesses = businesses_at(&[0.1, 0.2]);
    let ranked = find_potential_locations(&businesses, &[], &[], &config).unwrap();

    for location in &ranked {
        assert!(location.location.lat >= 0.0 && location.location.lat <= 0.01);
        assert!(location.location.lng >= 0.0 && location.location.lng <= 0.01);
    }
}
