//! Tests for competitor analysis

use petaloka::competitor::{
    CompetitorAnalyzer, CompetitorOptions, GapOpportunity, RecommendationKind, SaturationLevel,
    Winner,
};
use petaloka::error::AnalysisError;
use petaloka::synthetic::SyntheticScenario;
use petaloka::{GeoPoint, TargetLocation};

/// Degrees of latitude spanning `km` kilometers under the R = 6371 haversine.
fn lat_degrees(km: f64) -> f64 {
    km / (6371.0 * std::f64::consts::PI / 180.0)
}

const TARGET_LAT: f64 = -6.9147;
const TARGET_LNG: f64 = 107.6098;

/// Five same-category competitors due north at known distances.
fn bandung_competitors() -> Vec<GeoPoint> {
    [0.1, 0.25, 0.5, 0.9, 1.5]
        .iter()
        .enumerate()
        .map(|(i, km)| {
            GeoPoint::new(
                format!("umkm-{i}"),
                format!("Warung {i}"),
                "Kuliner",
                TARGET_LAT + lat_degrees(*km),
                TARGET_LNG,
            )
        })
        .collect()
}

#[test]
fn test_bandung_worked_example() {
    let analyzer = CompetitorAnalyzer::new(bandung_competitors());
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let options = CompetitorOptions {
        radius_km: 2.0,
        ..CompetitorOptions::default()
    };

    let report = analyzer.analyze(&target, &options).unwrap();

    assert_eq!(report.summary.total_competitors, 5);
    assert_eq!(report.density_zones.very_close, 2);
    assert_eq!(report.density_zones.close, 1);
    assert_eq!(report.density_zones.moderate, 2);
    assert_eq!(report.summary.saturation_level, SaturationLevel::Moderate);

    // intensity = min(100, 5*5 + ((2*3 + 1*2 + 2*1) / 5) * 20) = 65
    assert_eq!(report.summary.intensity_score, 65.0);
    assert_eq!(report.summary.opportunity_score, 35.0);

    // Only the healthy-competition rule fires for this landscape
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(
        report.recommendations[0].kind,
        RecommendationKind::Opportunity
    );
    assert_eq!(report.recommendations[0].title, "Healthy Competition");

    // Top competitors come back closest first
    let distances: Vec<f64> = report.top_competitors.iter().map(|c| c.distance).collect();
    assert_eq!(distances, vec![0.1, 0.25, 0.5, 0.9, 1.5]);
}

#[test]
fn test_density_zones_partition_competitor_set() {
    let dataset = SyntheticScenario::default().generate();
    let analyzer = CompetitorAnalyzer::new(dataset.businesses);
    let target = TargetLocation::new(-6.9147, 107.6098);
    let options = CompetitorOptions {
        radius_km: 10.0,
        include_all_categories: true,
        max_competitors: 1000,
        ..CompetitorOptions::default()
    };

    let report = analyzer.analyze(&target, &options).unwrap();
    let zones = report.density_zones;
    assert_eq!(
        zones.very_close + zones.close + zones.moderate,
        report.summary.total_competitors
    );
    assert!(report.summary.total_competitors > 0);
}

#[test]
fn test_intensity_and_opportunity_sum_to_hundred() {
    let dataset = SyntheticScenario::default().generate();
    let analyzer = CompetitorAnalyzer::new(dataset.businesses);
    let options = CompetitorOptions {
        include_all_categories: true,
        ..CompetitorOptions::default()
    };

    for radius in [0.25, 1.0, 5.0] {
        let report = analyzer
            .analyze(
                &TargetLocation::new(-6.9147, 107.6098),
                &CompetitorOptions {
                    radius_km: radius,
                    ..options.clone()
                },
            )
            .unwrap();
        let summary = &report.summary;
        assert!(summary.intensity_score >= 0.0 && summary.intensity_score <= 100.0);
        assert!(summary.opportunity_score >= 0.0 && summary.opportunity_score <= 100.0);
        assert_eq!(summary.intensity_score + summary.opportunity_score, 100.0);
    }
}

#[test]
fn test_category_filter_excludes_other_categories() {
    let mut businesses = bandung_competitors();
    businesses.push(GeoPoint::new(
        "other-1",
        "Butik Dekat",
        "Fashion",
        TARGET_LAT + lat_degrees(0.2),
        TARGET_LNG,
    ));

    let analyzer = CompetitorAnalyzer::new(businesses);
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let options = CompetitorOptions {
        radius_km: 2.0,
        ..CompetitorOptions::default()
    };

    let same_category = analyzer.analyze(&target, &options).unwrap();
    assert_eq!(same_category.summary.total_competitors, 5);

    let all = analyzer
        .analyze(
            &target,
            &CompetitorOptions {
                include_all_categories: true,
                ..options
            },
        )
        .unwrap();
    assert_eq!(all.summary.total_competitors, 6);
    assert_eq!(all.by_category.len(), 2);
    assert_eq!(all.by_category[0].category, "Kuliner");
    assert_eq!(all.by_category[0].count, 5);
}

#[test]
fn test_max_competitors_truncates_after_sorting() {
    let analyzer = CompetitorAnalyzer::new(bandung_competitors());
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let options = CompetitorOptions {
        radius_km: 2.0,
        max_competitors: 2,
        ..CompetitorOptions::default()
    };

    let report = analyzer.analyze(&target, &options).unwrap();
    assert_eq!(report.summary.total_competitors, 2);
    let distances: Vec<f64> = report.top_competitors.iter().map(|c| c.distance).collect();
    assert_eq!(distances, vec![0.1, 0.25]);
}

#[test]
fn test_empty_market_raises_zero_competition_warning() {
    let analyzer = CompetitorAnalyzer::new(Vec::new());
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");

    let report = analyzer
        .analyze(&target, &CompetitorOptions::default())
        .unwrap();

    assert_eq!(report.summary.total_competitors, 0);
    assert_eq!(report.summary.saturation_level, SaturationLevel::VeryLow);
    assert_eq!(report.summary.intensity_score, 0.0);
    assert_eq!(report.summary.opportunity_score, 100.0);
    assert!(report.by_category.is_empty());
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.title == "Zero Competition Alert" && r.kind == RecommendationKind::Warning));
}

#[test]
fn test_crowded_market_raises_proximity_warning_and_strategy() {
    // Eight same-category competitors packed within 250 m
    let businesses: Vec<GeoPoint> = (0..8)
        .map(|i| {
            GeoPoint::new(
                format!("umkm-{i}"),
                format!("Warung {i}"),
                "Kuliner",
                TARGET_LAT + lat_degrees(0.05 + i as f64 * 0.02),
                TARGET_LNG,
            )
        })
        .collect();

    let analyzer = CompetitorAnalyzer::new(businesses);
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let report = analyzer
        .analyze(&target, &CompetitorOptions::default())
        .unwrap();

    assert_eq!(report.density_zones.very_close, 8);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.title == "High Proximity Competition" && r.kind == RecommendationKind::Warning));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.title == "Differentiation Required" && r.kind == RecommendationKind::Strategy));
}

#[test]
fn test_invalid_radius_is_rejected() {
    let analyzer = CompetitorAnalyzer::new(bandung_competitors());
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let err = analyzer
        .analyze(
            &target,
            &CompetitorOptions {
                radius_km: 0.0,
                ..CompetitorOptions::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRadius(_)));
}

#[test]
fn test_compare_prefers_quieter_location() {
    let analyzer = CompetitorAnalyzer::new(bandung_competitors());
    // Far from every competitor
    let quiet = TargetLocation::with_category(TARGET_LAT - 1.0, TARGET_LNG, "Kuliner");
    let crowded = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let options = CompetitorOptions {
        radius_km: 2.0,
        ..CompetitorOptions::default()
    };

    let comparison = analyzer.compare(&quiet, &crowded, &options).unwrap();

    assert_eq!(comparison.comparison.competitors.winner, Winner::Location1);
    assert_eq!(comparison.comparison.opportunity.winner, Winner::Location1);
    assert_eq!(comparison.comparison.intensity.winner, Winner::Location1);
    assert_eq!(comparison.winner, Winner::Location1);
    assert!(comparison.recommendation.starts_with("Lokasi 1"));
}

#[test]
fn test_market_gaps_rank_thin_categories_first() {
    let mut businesses = bandung_competitors();
    businesses.push(GeoPoint::new(
        "f-1",
        "Butik Satu",
        "Fashion",
        TARGET_LAT + lat_degrees(0.4),
        TARGET_LNG,
    ));

    let analyzer = CompetitorAnalyzer::new(businesses);
    let target = TargetLocation::new(TARGET_LAT, TARGET_LNG);
    let categories = vec![
        "Kuliner".to_string(),
        "Fashion".to_string(),
        "Kerajinan".to_string(),
    ];
    let options = CompetitorOptions {
        radius_km: 2.0,
        ..CompetitorOptions::default()
    };

    let report = analyzer.market_gaps(&target, &categories, &options).unwrap();

    assert_eq!(report.gaps.len(), 3);
    assert_eq!(report.gaps[0].category, "Kerajinan");
    assert_eq!(report.gaps[0].score, 100.0);
    assert_eq!(report.gaps[0].opportunity, GapOpportunity::High);
    assert_eq!(report.gaps[1].category, "Fashion");
    assert_eq!(report.gaps[1].score, 85.0);
    assert_eq!(report.gaps[1].opportunity, GapOpportunity::Medium);
    assert_eq!(report.gaps[2].category, "Kuliner");
    assert_eq!(report.gaps[2].score, 25.0);
    assert_eq!(report.gaps[2].opportunity, GapOpportunity::Low);

    // Only scores >= 70 qualify as top opportunities
    let top: Vec<&str> = report
        .top_opportunities
        .iter()
        .map(|g| g.category.as_str())
        .collect();
    assert_eq!(top, vec!["Kerajinan", "Fashion"]);
}

#[test]
fn test_report_serializes_with_upstream_keys() {
    let analyzer = CompetitorAnalyzer::new(bandung_competitors());
    let target = TargetLocation::with_category(TARGET_LAT, TARGET_LNG, "Kuliner");
    let report = analyzer
        .analyze(
            &target,
            &CompetitorOptions {
                radius_km: 2.0,
                ..CompetitorOptions::default()
            },
        )
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        value["summary"]["saturationLevel"],
        serde_json::json!("Moderate")
    );
    assert!(value["densityZones"]["veryClose"].is_number());
    assert_eq!(value["recommendations"][0]["type"], "opportunity");
    assert_eq!(value["topCompetitors"][0]["source"], "umkm");
}
