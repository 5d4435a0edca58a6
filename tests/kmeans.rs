//! Tests for the K-Means clustering module

use petaloka::error::AnalysisError;
use petaloka::kmeans::cluster_points;
use petaloka::synthetic::SyntheticScenario;
use petaloka::{GeoPoint, KMeansConfig};

/// Two tight, well-separated blobs of points.
fn two_blobs() -> Vec<GeoPoint> {
    let mut points = Vec::new();
    for i in 0..10 {
        let offset = i as f64 * 0.0001;
        points.push(GeoPoint::new(
            format!("a-{i}"),
            format!("A{i}"),
            "shop",
            offset,
            offset,
        ));
        points.push(GeoPoint::new(
            format!("b-{i}"),
            format!("B{i}"),
            "shop",
            10.0 + offset,
            10.0 + offset,
        ));
    }
    points
}

#[test]
fn test_empty_input_yields_empty_outcome() {
    let outcome = cluster_points(&[], None, &KMeansConfig::default()).unwrap();
    assert!(outcome.clusters.is_empty());
    assert!(outcome.centroids.is_empty());
    assert_eq!(outcome.cluster_count, 0);
}

#[test]
fn test_single_point_falls_back_to_one_cluster() {
    let points = vec![GeoPoint::new("a", "A", "shop", -6.9, 107.6)];
    let outcome = cluster_points(&points, None, &KMeansConfig::default()).unwrap();
    assert_eq!(outcome.cluster_count, 1);
    assert_eq!(outcome.clusters.len(), 1);
    assert_eq!(outcome.clusters[0].items.len(), 1);
    let report = outcome.auto_selection.unwrap();
    assert_eq!(report.optimal_k, 1);
    assert!(report.scores.is_empty());
}

#[test]
fn test_every_point_assigned_exactly_once() {
    let dataset = SyntheticScenario::default().generate();
    let outcome = cluster_points(&dataset.businesses, Some(4), &KMeansConfig::default()).unwrap();

    let total: usize = outcome.clusters.iter().map(|c| c.items.len()).sum();
    assert_eq!(total, dataset.businesses.len());

    for cluster in &outcome.clusters {
        for item in &cluster.items {
            assert_eq!(item.cluster, cluster.id);
        }
    }
}

#[test]
fn test_cluster_ids_match_centroid_indices() {
    let outcome = cluster_points(&two_blobs(), Some(3), &KMeansConfig::default()).unwrap();
    assert_eq!(outcome.clusters.len(), 3);
    assert_eq!(outcome.centroids.len(), 3);
    for (i, cluster) in outcome.clusters.iter().enumerate() {
        assert_eq!(cluster.id, i);
        assert_eq!(outcome.centroids[i].id, i);
    }
}

#[test]
fn test_explicit_k_larger_than_n_is_clamped() {
    let points = vec![
        GeoPoint::new("a", "A", "shop", 0.0, 0.0),
        GeoPoint::new("b", "B", "shop", 1.0, 1.0),
        GeoPoint::new("c", "C", "shop", 2.0, 2.0),
    ];
    let outcome = cluster_points(&points, Some(10), &KMeansConfig::default()).unwrap();
    assert_eq!(outcome.cluster_count, 3);
}

#[test]
fn test_zero_k_is_rejected() {
    let points = vec![GeoPoint::new("a", "A", "shop", 0.0, 0.0)];
    let err = cluster_points(&points, Some(0), &KMeansConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InvalidClusterCount { requested: 0, .. }
    ));
}

#[test]
fn test_invalid_points_are_dropped() {
    let mut points = two_blobs();
    points.push(GeoPoint::new("bad", "Bad", "shop", f64::NAN, 0.0));
    points.push(GeoPoint::new("worse", "Worse", "shop", 95.0, 0.0));

    let outcome = cluster_points(&points, Some(2), &KMeansConfig::default()).unwrap();
    let total: usize = outcome.clusters.iter().map(|c| c.items.len()).sum();
    assert_eq!(total, points.len() - 2);
}

#[test]
fn test_auto_selection_finds_two_blobs() {
    let outcome = cluster_points(&two_blobs(), None, &KMeansConfig::default()).unwrap();
    assert_eq!(outcome.cluster_count, 2);

    let report = outcome.auto_selection.unwrap();
    assert_eq!(report.optimal_k, 2);
    assert!(report.best_score > 0.8);
    // Candidates scanned from 2 up to min(10, n - 1)
    assert_eq!(report.scores.first().unwrap().k, 2);
    assert_eq!(report.scores.last().unwrap().k, 10);

    // Each blob ends up in its own cluster
    let sizes: Vec<usize> = outcome.clusters.iter().map(|c| c.items.len()).collect();
    assert_eq!(sizes, vec![10, 10]);
}

#[test]
fn test_deterministic_under_fixed_seed() {
    let dataset = SyntheticScenario::default().generate();
    let config = KMeansConfig::default();

    let first = cluster_points(&dataset.businesses, Some(5), &config).unwrap();
    let second = cluster_points(&dataset.businesses, Some(5), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_enriched_items_keep_original_fields() {
    let dataset = SyntheticScenario::default().generate();
    let outcome = cluster_points(&dataset.businesses, Some(3), &KMeansConfig::default()).unwrap();

    let item = &outcome.clusters.iter().find(|c| !c.items.is_empty()).unwrap().items[0];
    let original = dataset
        .businesses
        .iter()
        .find(|p| p.id == item.point.id)
        .unwrap();
    assert_eq!(&item.point, original);
    assert_eq!(item.centroid, outcome.clusters[item.cluster].centroid);
}

#[test]
fn test_centroid_radius_has_minimum() {
    let points = vec![GeoPoint::new("a", "A", "shop", -6.9, 107.6)];
    let outcome = cluster_points(&points, Some(1), &KMeansConfig::default()).unwrap();
    assert_eq!(outcome.centroids[0].radius_m, 500.0);
}

#[test]
fn test_silhouette_reflects_separation() {
    let separated = cluster_points(&two_blobs(), Some(2), &KMeansConfig::default()).unwrap();
    assert!(separated.silhouette_score > 0.9);

    let single = cluster_points(&two_blobs(), Some(1), &KMeansConfig::default()).unwrap();
    assert_eq!(single.silhouette_score, 0.0);
}
