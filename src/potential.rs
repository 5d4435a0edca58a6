//! Location-potential scoring and grid scanning.
//!
//! Scores a candidate coordinate for a new business from three weighted
//! components: competitor balance (a sweet spot, not a minimum), proximity
//! to tourism attractions and proximity to training facilities. The grid
//! scanner lays a lattice of candidate points over a bounding box, scores
//! every point and ranks the survivors.

use log::{debug, info};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::geo_utils::{compute_bounds, haversine_distance};
use crate::{BoundingBox, GeoPoint, TargetLocation};

/// Scoring configuration with the documented defaults.
#[derive(Debug, Clone)]
pub struct PotentialConfig {
    /// Search radius in kilometers. Default: 1.0
    pub search_radius_km: f64,

    /// Weight of the competitor-balance component. Default: 0.3
    pub competitor_weight: f64,

    /// Weight of the attraction-proximity component. Default: 0.35
    pub wisata_weight: f64,

    /// Weight of the training-proximity component. Default: 0.35
    pub pelatihan_weight: f64,

    /// Competitor sweet spot: enough neighbors to prove demand without
    /// saturation. Default: 3
    pub optimal_competitor_count: usize,
}

impl Default for PotentialConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 1.0,
            competitor_weight: 0.3,
            wisata_weight: 0.35,
            pelatihan_weight: 0.35,
            optimal_competitor_count: 3,
        }
    }
}

/// Grid-scan configuration on top of the scoring defaults.
#[derive(Debug, Clone)]
pub struct GridScanConfig {
    /// Scan area; derived from the data union with 10% padding when None.
    pub bounds: Option<BoundingBox>,

    /// Grid spacing in kilometers. Default: 0.5
    pub grid_size_km: f64,

    /// Number of ranked locations to return. Default: 10
    pub top_n: usize,

    /// Minimum score for a candidate to be kept. Default: 50.0
    pub min_score: f64,

    /// Per-point scoring configuration.
    pub scoring: PotentialConfig,
}

impl Default for GridScanConfig {
    fn default() -> Self {
        Self {
            bounds: None,
            grid_size_km: 0.5,
            top_n: 10,
            min_score: 50.0,
            scoring: PotentialConfig::default(),
        }
    }
}

/// Viability rating bands for a scored location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PotentialRating {
    #[serde(rename = "Sangat Potensial")]
    SangatPotensial,
    #[serde(rename = "Potensial")]
    Potensial,
    #[serde(rename = "Cukup Potensial")]
    CukupPotensial,
    #[serde(rename = "Kurang Potensial")]
    KurangPotensial,
}

impl PotentialRating {
    fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Self::SangatPotensial
        } else if score >= 60.0 {
            Self::Potensial
        } else if score >= 40.0 {
            Self::CukupPotensial
        } else {
            Self::KurangPotensial
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            Self::SangatPotensial => {
                "Lokasi ideal untuk UMKM baru! Dekat dengan wisata dan pelatihan, kompetisi sehat."
            }
            Self::Potensial => {
                "Lokasi bagus untuk UMKM. Pertimbangkan diferensiasi produk untuk bersaing."
            }
            Self::CukupPotensial => {
                "Lokasi memiliki potensi sedang. Perlu strategi marketing yang kuat."
            }
            Self::KurangPotensial => {
                "Lokasi kurang ideal. Pertimbangkan lokasi lain atau niche market yang spesifik."
            }
        }
    }
}

/// A nearby competitor in the detail listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyCompetitor {
    pub name: String,
    pub category: String,
    /// Kilometers, 3 decimals.
    pub distance: f64,
}

/// A nearby attraction or training site in the detail listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPlace {
    pub name: String,
    /// Kilometers, 3 decimals.
    pub distance: f64,
}

/// Competitor component detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorDetail {
    pub count: usize,
    /// Component score scaled to 0-100.
    pub score: f64,
    /// Up to 10 in-radius competitors, in input order.
    pub list: Vec<NearbyCompetitor>,
}

/// Proximity component detail (attractions or training sites).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityDetail {
    /// Mean distance to the nearest neighbors, km, 3 decimals.
    pub avg_distance: f64,
    /// Component score scaled to 0-100.
    pub score: f64,
    /// The nearest places, up to 3.
    pub nearest: Vec<NearbyPlace>,
}

/// Component details behind a location score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialDetails {
    pub competitors: CompetitorDetail,
    pub wisata: ProximityDetail,
    pub pelatihan: ProximityDetail,
}

/// Viability assessment of one candidate location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPotential {
    pub location: TargetLocation,
    /// Weighted total in [0, 100], 1 decimal.
    pub score: f64,
    pub rating: PotentialRating,
    pub recommendation: String,
    pub details: PotentialDetails,
}

/// Score one candidate location.
///
/// The competitor component rewards the sweet spot: zero neighbors means
/// unproven demand (0.3), up to `optimal_competitor_count` climbs from 0.7
/// to 1.0, and every competitor beyond the optimum costs 0.1 down to a
/// 0.2 floor. Proximity components decay linearly with the mean distance
/// to the nearest 5 attractions / 3 training sites; an empty collection
/// counts as twice the search radius away.
///
/// # Errors
/// `InvalidRadius` when `config.search_radius_km` is not positive.
pub fn calculate_location_potential(
    location: &TargetLocation,
    businesses: &[GeoPoint],
    attractions: &[GeoPoint],
    training_sites: &[GeoPoint],
    config: &PotentialConfig,
) -> Result<LocationPotential> {
    if !(config.search_radius_km > 0.0) {
        return Err(AnalysisError::InvalidRadius(config.search_radius_km));
    }

    let radius = config.search_radius_km;

    // Competitors within the radius, input order preserved
    let competitors: Vec<(&GeoPoint, f64)> = businesses
        .iter()
        .map(|p| (p, haversine_distance(location.lat, location.lng, p.lat, p.lon)))
        .filter(|(_, d)| *d <= radius)
        .collect();
    let competitor_count = competitors.len();

    let nearest_wisata = nearest_by_distance(location, attractions, 5);
    let avg_wisata_distance = average_distance(&nearest_wisata, radius);

    let nearest_pelatihan = nearest_by_distance(location, training_sites, 3);
    let avg_pelatihan_distance = average_distance(&nearest_pelatihan, radius);

    let competitor_score = competitor_component(competitor_count, config.optimal_competitor_count);
    let wisata_score = (1.0 - avg_wisata_distance / radius).max(0.0);
    let pelatihan_score = (1.0 - avg_pelatihan_distance / radius).max(0.0);

    let total_score = ((competitor_score * config.competitor_weight
        + wisata_score * config.wisata_weight
        + pelatihan_score * config.pelatihan_weight)
        * 100.0)
        .clamp(0.0, 100.0);
    let score = round1(total_score);

    let rating = PotentialRating::from_score(score);

    Ok(LocationPotential {
        location: location.clone(),
        score,
        rating,
        recommendation: rating.recommendation().to_string(),
        details: PotentialDetails {
            competitors: CompetitorDetail {
                count: competitor_count,
                score: (competitor_score * 100.0).round(),
                list: competitors
                    .iter()
                    .take(10)
                    .map(|(p, d)| NearbyCompetitor {
                        name: p.name.clone(),
                        category: p.category.clone(),
                        distance: round3(*d),
                    })
                    .collect(),
            },
            wisata: ProximityDetail {
                avg_distance: round3(avg_wisata_distance),
                score: (wisata_score * 100.0).round(),
                nearest: nearest_places(&nearest_wisata, 3),
            },
            pelatihan: ProximityDetail {
                avg_distance: round3(avg_pelatihan_distance),
                score: (pelatihan_score * 100.0).round(),
                nearest: nearest_places(&nearest_pelatihan, 3),
            },
        },
    })
}

/// Lay a lattice of candidate points over `bounds`, spaced `grid_size_km`
/// on both axes.
///
/// One degree of latitude counts as 111 km; the longitude step is
/// corrected with the cosine of the NORTHERN boundary's latitude for the
/// whole grid, not per row. Existing consumers depend on the resulting
/// point layout, so keep the single-latitude correction as is.
///
/// # Errors
/// `InvalidBounds` for an inverted or non-finite box, `InvalidGridSpacing`
/// for a non-positive spacing.
pub fn generate_grid_points(
    bounds: &BoundingBox,
    grid_size_km: f64,
) -> Result<Vec<TargetLocation>> {
    if !bounds.is_valid() {
        return Err(AnalysisError::InvalidBounds {
            north: bounds.north,
            south: bounds.south,
            east: bounds.east,
            west: bounds.west,
        });
    }
    if !(grid_size_km > 0.0) {
        return Err(AnalysisError::InvalidGridSpacing(grid_size_km));
    }

    let lat_step = grid_size_km / 111.0;
    let lng_step = grid_size_km / (111.0 * (bounds.north * std::f64::consts::PI / 180.0).cos());

    let mut points = Vec::new();
    let mut point_id = 1u32;
    let mut lat = bounds.south;
    while lat <= bounds.north {
        let mut lng = bounds.west;
        while lng <= bounds.east {
            points.push(TargetLocation {
                lat: round5(lat),
                lng: round5(lng),
                name: Some(format!("Point {point_id}")),
                category: None,
            });
            point_id += 1;
            lng += lng_step;
        }
        lat += lat_step;
    }

    debug!(
        "grid over [{:.4}..{:.4}] x [{:.4}..{:.4}]: {} points at {} km spacing",
        bounds.south,
        bounds.north,
        bounds.west,
        bounds.east,
        points.len(),
        grid_size_km
    );

    Ok(points)
}

/// Scan a grid of candidate locations and return the best scorers.
///
/// When no bounds are configured they are derived from the union of all
/// three datasets with 10% padding; an empty union yields an empty
/// result. Candidates below `min_score` are dropped, the rest sorted
/// descending and truncated to `top_n`.
///
/// Cost is O(grid_points x (businesses + attractions + training_sites));
/// callers wanting bounded latency cap the grid via `bounds` and
/// `grid_size_km`. With the `parallel` feature the scan fans out over
/// rayon.
pub fn find_potential_locations(
    businesses: &[GeoPoint],
    attractions: &[GeoPoint],
    training_sites: &[GeoPoint],
    config: &GridScanConfig,
) -> Result<Vec<LocationPotential>> {
    let bounds = match config.bounds {
        Some(bounds) => bounds,
        None => {
            let union: Vec<GeoPoint> = businesses
                .iter()
                .chain(attractions.iter())
                .chain(training_sites.iter())
                .cloned()
                .collect();
            match compute_bounds(&union, 0.1) {
                Some(bounds) => bounds,
                None => return Ok(Vec::new()),
            }
        }
    };

    let grid = generate_grid_points(&bounds, config.grid_size_km)?;

    info!(
        "scanning {} grid points against {} businesses, {} attractions, {} training sites",
        grid.len(),
        businesses.len(),
        attractions.len(),
        training_sites.len()
    );

    #[cfg(feature = "parallel")]
    let scored: Result<Vec<LocationPotential>> = grid
        .par_iter()
        .map(|point| {
            calculate_location_potential(
                point,
                businesses,
                attractions,
                training_sites,
                &config.scoring,
            )
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let scored: Result<Vec<LocationPotential>> = grid
        .iter()
        .map(|point| {
            calculate_location_potential(
                point,
                businesses,
                attractions,
                training_sites,
                &config.scoring,
            )
        })
        .collect();

    let mut ranked: Vec<LocationPotential> = scored?
        .into_iter()
        .filter(|loc| loc.score >= config.min_score)
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(config.top_n);

    Ok(ranked)
}

// ============================================================================
// Internals
// ============================================================================

fn competitor_component(count: usize, optimal: usize) -> f64 {
    if count == 0 {
        0.3
    } else if count <= optimal {
        0.7 + (count as f64 / optimal.max(1) as f64) * 0.3
    } else {
        let excess = (count - optimal) as f64;
        (1.0 - excess * 0.1).max(0.2)
    }
}

/// Distances to every place, ascending, truncated to `n`.
fn nearest_by_distance<'a>(
    location: &TargetLocation,
    places: &'a [GeoPoint],
    n: usize,
) -> Vec<(&'a GeoPoint, f64)> {
    let mut distances: Vec<(&GeoPoint, f64)> = places
        .iter()
        .map(|p| (p, haversine_distance(location.lat, location.lng, p.lat, p.lon)))
        .collect();
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(n);
    distances
}

/// Mean of the nearest distances; an empty set counts as twice the radius.
fn average_distance(nearest: &[(&GeoPoint, f64)], radius_km: f64) -> f64 {
    if nearest.is_empty() {
        return radius_km * 2.0;
    }
    nearest.iter().map(|(_, d)| d).sum::<f64>() / nearest.len() as f64
}

fn nearest_places(nearest: &[(&GeoPoint, f64)], n: usize) -> Vec<NearbyPlace> {
    nearest
        .iter()
        .take(n)
        .map(|(p, d)| NearbyPlace {
            name: p.name.clone(),
            distance: round3(*d),
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}
