//! K-Means clustering over geotagged points.
//!
//! This module provides the clustering primitive used by the combined
//! analyses: k-means++ seeding, Lloyd iterations with a fixed iteration
//! cap, an exact silhouette coefficient, and automatic selection of the
//! cluster count.
//!
//! Assignment distance is Euclidean on raw `[lat, lon]` pairs, a
//! coordinate-plane approximation used for clustering only; every
//! kilometer figure reported to callers still comes from
//! [`crate::geo_utils::haversine_distance`].

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::geo_utils::haversine_distance;
use crate::{GeoPoint, LatLon};

/// Minimum display radius for a cluster centroid, in meters.
const MIN_CENTROID_RADIUS_M: f64 = 500.0;

/// Configuration for K-Means runs.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Iteration cap guaranteeing termination without convergence.
    /// Default: 100
    pub max_iterations: usize,

    /// Smallest candidate K tried during automatic selection.
    /// Default: 2
    pub min_auto_clusters: usize,

    /// Largest candidate K tried during automatic selection.
    /// Default: 10
    pub max_auto_clusters: usize,

    /// Seed for the k-means++ initialization RNG. Runs with the same
    /// seed and input are bit-identical. Default: 42
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            min_auto_clusters: 2,
            max_auto_clusters: 10,
            seed: 42,
        }
    }
}

/// A point enriched with its cluster assignment.
///
/// Embeds the original record unchanged; serialization flattens it so the
/// output carries every original field plus `cluster` and `centroid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredPoint {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub cluster: usize,
    pub centroid: LatLon,
}

/// A group of points sharing the same centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: usize,
    pub centroid: LatLon,
    pub items: Vec<ClusteredPoint>,
}

/// A centroid with the display radius covering its members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    pub id: usize,
    pub lat: f64,
    pub lon: f64,
    /// Max haversine distance from centroid to a member in meters,
    /// floored at 500 m.
    pub radius_m: f64,
}

/// Quality score for one candidate K.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KScore {
    pub k: usize,
    pub score: f64,
}

/// Report from the automatic cluster-count scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoKReport {
    pub optimal_k: usize,
    pub best_score: f64,
    pub scores: Vec<KScore>,
}

/// Result of one clustering call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOutcome {
    /// Exactly `cluster_count` clusters with ids 0..K-1. A cluster that
    /// lost all members during iteration keeps its id, its last centroid
    /// and an empty item list.
    pub clusters: Vec<Cluster>,
    /// Centroids indexed to match cluster ids.
    pub centroids: Vec<Centroid>,
    pub cluster_count: usize,
    /// Silhouette coefficient of the final partition (0.0 when K < 2).
    pub silhouette_score: f64,
    /// Present when K was selected automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_selection: Option<AutoKReport>,
}

impl ClusterOutcome {
    fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            centroids: Vec::new(),
            cluster_count: 0,
            silhouette_score: 0.0,
            auto_selection: None,
        }
    }
}

/// Partition points into K clusters by coordinates.
///
/// `k = None` selects the cluster count automatically by scanning
/// candidate values and keeping the best silhouette score. Points with
/// non-finite or out-of-range coordinates are dropped before clustering;
/// an empty (or fully invalid) input yields an empty outcome.
///
/// # Errors
/// `InvalidClusterCount` when an explicit `k` of 0 is requested. An
/// explicit `k` larger than the point count is clamped to the count.
pub fn cluster_points(
    points: &[GeoPoint],
    k: Option<usize>,
    config: &KMeansConfig,
) -> Result<ClusterOutcome> {
    let valid: Vec<&GeoPoint> = points.iter().filter(|p| p.is_valid()).collect();
    if valid.is_empty() {
        return Ok(ClusterOutcome::empty());
    }

    let coords: Vec<[f64; 2]> = valid.iter().map(|p| [p.lat, p.lon]).collect();

    let (final_k, auto_selection) = match k {
        Some(0) => {
            return Err(AnalysisError::InvalidClusterCount {
                requested: 0,
                available: coords.len(),
            })
        }
        Some(requested) => (requested.min(coords.len()), None),
        None => {
            let report = find_optimal_clusters(&coords, config);
            let optimal = report.optimal_k;
            (optimal, Some(report))
        }
    };

    let run = lloyd(&coords, final_k, config);
    let silhouette_score = silhouette_coefficient(&coords, &run.assignments);

    debug!(
        "k-means: {} points, k={}, {} iterations, silhouette={:.4}",
        coords.len(),
        final_k,
        run.iterations,
        silhouette_score
    );

    let mut clusters: Vec<Cluster> = run
        .centroids
        .iter()
        .enumerate()
        .map(|(id, c)| Cluster {
            id,
            centroid: LatLon::new(c[0], c[1]),
            items: Vec::new(),
        })
        .collect();

    for (i, &assignment) in run.assignments.iter().enumerate() {
        let centroid = clusters[assignment].centroid;
        clusters[assignment].items.push(ClusteredPoint {
            point: (*valid[i]).clone(),
            cluster: assignment,
            centroid,
        });
    }

    let centroids = clusters
        .iter()
        .map(|cluster| {
            let radius_m = cluster
                .items
                .iter()
                .map(|item| {
                    haversine_distance(
                        cluster.centroid.lat,
                        cluster.centroid.lon,
                        item.point.lat,
                        item.point.lon,
                    ) * 1000.0
                })
                .fold(0.0_f64, f64::max)
                .max(MIN_CENTROID_RADIUS_M);
            Centroid {
                id: cluster.id,
                lat: cluster.centroid.lat,
                lon: cluster.centroid.lon,
                radius_m,
            }
        })
        .collect();

    Ok(ClusterOutcome {
        clusters,
        centroids,
        cluster_count: final_k,
        silhouette_score,
        auto_selection,
    })
}

/// Scan candidate cluster counts and keep the silhouette-best one.
///
/// Candidates are `min_auto_clusters ..= min(max_auto_clusters, n - 1)`.
/// When the range is empty (fewer than 3 points) the scan falls back to
/// a single cluster.
pub fn find_optimal_clusters(coords: &[[f64; 2]], config: &KMeansConfig) -> AutoKReport {
    let n = coords.len();
    let upper = config.max_auto_clusters.min(n.saturating_sub(1));

    if upper < config.min_auto_clusters {
        return AutoKReport {
            optimal_k: 1,
            best_score: 0.0,
            scores: Vec::new(),
        };
    }

    let mut scores = Vec::with_capacity(upper - config.min_auto_clusters + 1);
    let mut best_score = f64::MIN;
    let mut optimal_k = config.min_auto_clusters;

    for k in config.min_auto_clusters..=upper {
        let run = lloyd(coords, k, config);
        let score = silhouette_coefficient(coords, &run.assignments);
        scores.push(KScore { k, score });

        if score > best_score {
            best_score = score;
            optimal_k = k;
        }
    }

    debug!(
        "auto-k scan over {} points: optimal k={} (score {:.4})",
        n, optimal_k, best_score
    );

    AutoKReport {
        optimal_k,
        best_score,
        scores,
    }
}

/// Exact silhouette coefficient of a partition.
///
/// For each point: `a` is the mean distance to other members of its own
/// cluster, `b` the smallest mean distance to another cluster, and the
/// per-point score `(b - a) / max(a, b)`. Points in singleton clusters
/// (and points where `a == b`) are skipped. Returns 0.0 when fewer than
/// two points or a single cluster.
pub fn silhouette_coefficient(coords: &[[f64; 2]], assignments: &[usize]) -> f64 {
    if coords.len() < 2 {
        return 0.0;
    }

    let cluster_count = assignments.iter().copied().max().map_or(0, |m| m + 1);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
    for (i, &c) in assignments.iter().enumerate() {
        members[c].push(i);
    }

    if members.iter().filter(|m| !m.is_empty()).count() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut valid_points = 0usize;

    for (i, coord) in coords.iter().enumerate() {
        let own = assignments[i];
        let own_members = &members[own];
        if own_members.len() < 2 {
            continue;
        }

        let a = own_members
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| euclidean(coord, &coords[j]))
            .sum::<f64>()
            / (own_members.len() - 1) as f64;

        let mut b = f64::INFINITY;
        for (other, other_members) in members.iter().enumerate() {
            if other == own || other_members.is_empty() {
                continue;
            }
            let avg = other_members
                .iter()
                .map(|&j| euclidean(coord, &coords[j]))
                .sum::<f64>()
                / other_members.len() as f64;
            b = b.min(avg);
        }

        if b.is_finite() && a != b {
            total += (b - a) / a.max(b);
            valid_points += 1;
        }
    }

    if valid_points > 0 {
        total / valid_points as f64
    } else {
        0.0
    }
}

// ============================================================================
// Internals
// ============================================================================

struct KMeansRun {
    assignments: Vec<usize>,
    centroids: Vec<[f64; 2]>,
    iterations: usize,
}

/// One full K-Means pass: k-means++ seeding, then assignment/update
/// iterations until assignments stabilize or the cap is reached.
fn lloyd(coords: &[[f64; 2]], k: usize, config: &KMeansConfig) -> KMeansRun {
    debug_assert!(k >= 1 && k <= coords.len());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut centroids = seed_centroids(coords, k, &mut rng);
    let mut assignments = vec![0usize; coords.len()];
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        iterations = iter + 1;
        let mut changed = false;

        // Assignment: nearest centroid by planar distance
        for (i, coord) in coords.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let dist = euclidean_sq(coord, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            if assignments[i] != best {
                assignments[i] = best;
                changed = true;
            }
        }

        if iter > 0 && !changed {
            break;
        }

        // Update: member mean; an empty cluster keeps its last centroid
        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (i, coord) in coords.iter().enumerate() {
            let c = assignments[i];
            sums[c][0] += coord[0];
            sums[c][1] += coord[1];
            counts[c] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64];
            }
        }
    }

    KMeansRun {
        assignments,
        centroids,
        iterations,
    }
}

/// k-means++ seeding: the first centroid is drawn uniformly, each later
/// one with probability proportional to its squared distance from the
/// nearest already-chosen centroid.
fn seed_centroids(coords: &[[f64; 2]], k: usize, rng: &mut StdRng) -> Vec<[f64; 2]> {
    let n = coords.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(coords[rng.gen_range(0..n)]);

    while centroids.len() < k {
        let weights: Vec<f64> = coords
            .iter()
            .map(|coord| {
                centroids
                    .iter()
                    .map(|c| euclidean_sq(coord, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            // All remaining points coincide with a centroid
            centroids.push(coords[rng.gen_range(0..n)]);
            continue;
        }

        let r = rng.gen::<f64>() * sum;
        let mut cumulative = 0.0;
        let mut chosen = n - 1;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if cumulative >= r {
                chosen = i;
                break;
            }
        }
        centroids.push(coords[chosen]);
    }

    centroids
}

fn euclidean_sq(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn euclidean(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    euclidean_sq(a, b).sqrt()
}
