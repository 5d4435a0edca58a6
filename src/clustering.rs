//! Combined clustering analysis over the three point collections.
//!
//! Orchestrates [`crate::kmeans`] over businesses (UMKM), attractions
//! (wisata) and training sites (pelatihan): per-cluster category
//! statistics and dominant categories, tourism-potential labels, nearest
//! training lookups, one overall map-view clustering and the summary
//! counts. Every function here is a pure read of its inputs; empty
//! collections produce empty analyses, never an error.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::geo_utils::haversine_distance;
use crate::kmeans::{cluster_points, Centroid, Cluster, ClusteredPoint, KMeansConfig};
use crate::{CategoryCount, CategoryCounts, GeoPoint, LatLon, PointKind};

/// Category values treated as "unknown" when filtering businesses.
const UNKNOWN_CATEGORIES: [&str; 2] = ["lainnya", "other"];

/// How the cluster count was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionMethod {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "silhouette-optimized")]
    SilhouetteOptimized,
}

/// Per-cluster business statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProfile {
    pub cluster_id: usize,
    pub center: LatLon,
    pub total_items: usize,
    /// Category histogram in encounter order.
    pub categories: CategoryCounts,
    /// Most frequent category; earlier-seen wins ties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_category: Option<String>,
    pub items: Vec<ClusteredPoint>,
}

/// Featured-product (produk unggulan) analysis of the business clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessClusterAnalysis {
    pub clusters: Vec<ClusterProfile>,
    pub centroids: Vec<Centroid>,
    #[serde(rename = "totalUMKM")]
    pub total_umkm: usize,
    pub total_clusters: usize,
    pub silhouette_score: f64,
}

/// Tourism-potential label for an attraction cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TourismPotential {
    #[serde(rename = "Sangat Tinggi")]
    SangatTinggi,
    #[serde(rename = "Tinggi")]
    Tinggi,
    #[serde(rename = "Sedang")]
    Sedang,
    #[serde(rename = "Rendah")]
    Rendah,
}

impl TourismPotential {
    /// Label from `items * 10 + unique_categories * 5`.
    fn from_cluster(total_items: usize, unique_categories: usize) -> Self {
        let score = total_items * 10 + unique_categories * 5;
        if score >= 100 {
            Self::SangatTinggi
        } else if score >= 70 {
            Self::Tinggi
        } else if score >= 40 {
            Self::Sedang
        } else {
            Self::Rendah
        }
    }
}

impl fmt::Display for TourismPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SangatTinggi => "Sangat Tinggi",
            Self::Tinggi => "Tinggi",
            Self::Sedang => "Sedang",
            Self::Rendah => "Rendah",
        };
        f.write_str(label)
    }
}

/// Per-cluster attraction statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourismClusterProfile {
    pub cluster_id: usize,
    pub center: LatLon,
    pub total_items: usize,
    pub categories: CategoryCounts,
    /// The three most frequent categories.
    pub top_categories: Vec<CategoryCount>,
    #[serde(rename = "potensi")]
    pub potential: TourismPotential,
    pub items: Vec<ClusteredPoint>,
}

/// Micro-tourism (wisata mikro) analysis of the attraction clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourismClusterAnalysis {
    pub clusters: Vec<TourismClusterProfile>,
    pub centroids: Vec<Centroid>,
    pub total_wisata: usize,
    pub total_clusters: usize,
    pub silhouette_score: f64,
}

/// A training site matched to a business cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingMatch {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Haversine distance from the cluster centroid in kilometers.
    pub distance: f64,
}

/// Nearest training sites for one business cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecommendation {
    pub cluster_id: usize,
    pub centroid: LatLon,
    #[serde(rename = "totalUMKM")]
    pub total_umkm: usize,
    /// The three nearest sites, closest first.
    pub nearest_training: Vec<TrainingMatch>,
    /// Mean distance of the matches in km, 2 decimals; 0 when none.
    pub average_distance: f64,
}

/// Spatial concentration label for a combined cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DensityLevel {
    #[serde(rename = "Sangat Tinggi")]
    SangatTinggi,
    #[serde(rename = "Tinggi")]
    Tinggi,
    #[serde(rename = "Sedang")]
    Sedang,
    #[serde(rename = "Rendah")]
    Rendah,
}

/// Member counts per source collection in a combined cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub umkm: usize,
    pub wisata: usize,
}

/// Per-cluster statistics of the combined map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallClusterProfile {
    pub cluster_id: usize,
    pub center: LatLon,
    pub total_items: usize,
    pub breakdown: TypeBreakdown,
    pub density: DensityLevel,
}

/// Single combined clustering over businesses and attractions, for
/// consumers that need one map view of everything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAnalysis {
    pub clusters: Vec<Cluster>,
    pub centroids: Vec<Centroid>,
    pub analysis: Vec<OverallClusterProfile>,
    pub total_clusters: usize,
    pub silhouette_score: f64,
}

/// Headline counts of one combined analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    #[serde(rename = "totalUMKM")]
    pub total_umkm: usize,
    pub total_wisata: usize,
    pub total_pelatihan: usize,
    pub total_clusters: usize,
    pub silhouette_score: f64,
    pub method: SelectionMethod,
}

/// Top-level result of [`analyze_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAnalysis {
    pub produk_unggulan: BusinessClusterAnalysis,
    pub wisata_mikro: TourismClusterAnalysis,
    pub training_recommendations: Vec<TrainingRecommendation>,
    pub overall_clusters: OverallAnalysis,
    pub summary: AnalysisSummary,
}

/// Cluster the businesses with a known category and profile each cluster.
pub fn analyze_businesses(
    businesses: &[GeoPoint],
    k: Option<usize>,
    config: &KMeansConfig,
) -> Result<BusinessClusterAnalysis> {
    let known: Vec<GeoPoint> = businesses
        .iter()
        .filter(|p| has_known_category(p))
        .cloned()
        .collect();

    let outcome = cluster_points(&known, k, config)?;

    let clusters = outcome
        .clusters
        .iter()
        .map(|cluster| {
            let categories =
                CategoryCounts::tally(cluster.items.iter().map(|i| i.point.category.as_str()));
            let dominant_category = categories.dominant().map(str::to_string);
            ClusterProfile {
                cluster_id: cluster.id,
                center: cluster.centroid,
                total_items: cluster.items.len(),
                categories,
                dominant_category,
                items: cluster.items.clone(),
            }
        })
        .collect();

    Ok(BusinessClusterAnalysis {
        clusters,
        centroids: outcome.centroids,
        total_umkm: known.len(),
        total_clusters: outcome.cluster_count,
        silhouette_score: outcome.silhouette_score,
    })
}

/// Cluster the attractions and label each cluster's tourism potential.
pub fn analyze_attractions(
    attractions: &[GeoPoint],
    k: Option<usize>,
    config: &KMeansConfig,
) -> Result<TourismClusterAnalysis> {
    let outcome = cluster_points(attractions, k, config)?;

    let clusters = outcome
        .clusters
        .iter()
        .map(|cluster| {
            let categories =
                CategoryCounts::tally(cluster.items.iter().map(|i| i.point.category.as_str()));
            let potential = TourismPotential::from_cluster(cluster.items.len(), categories.len());
            TourismClusterProfile {
                cluster_id: cluster.id,
                center: cluster.centroid,
                total_items: cluster.items.len(),
                top_categories: categories.top(3),
                categories,
                potential,
                items: cluster.items.clone(),
            }
        })
        .collect();

    Ok(TourismClusterAnalysis {
        clusters,
        centroids: outcome.centroids,
        total_wisata: attractions.iter().filter(|p| p.is_valid()).count(),
        total_clusters: outcome.cluster_count,
        silhouette_score: outcome.silhouette_score,
    })
}

/// For each business cluster, find the three nearest training sites by
/// haversine distance from the cluster centroid, closest first.
pub fn recommend_training(
    business_clusters: &[Cluster],
    training_sites: &[GeoPoint],
) -> Vec<TrainingRecommendation> {
    let valid_sites: Vec<&GeoPoint> = training_sites.iter().filter(|p| p.is_valid()).collect();

    business_clusters
        .iter()
        .map(|cluster| {
            let mut matches: Vec<TrainingMatch> = valid_sites
                .iter()
                .map(|site| TrainingMatch {
                    id: site.id.clone(),
                    name: site.name.clone(),
                    category: site.category.clone(),
                    address: site.address.clone(),
                    phone: site.phone.clone(),
                    lat: site.lat,
                    lon: site.lon,
                    distance: haversine_distance(
                        cluster.centroid.lat,
                        cluster.centroid.lon,
                        site.lat,
                        site.lon,
                    ),
                })
                .collect();
            matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
            matches.truncate(3);

            let average_distance = if matches.is_empty() {
                0.0
            } else {
                round2(matches.iter().map(|m| m.distance).sum::<f64>() / matches.len() as f64)
            };

            TrainingRecommendation {
                cluster_id: cluster.id,
                centroid: cluster.centroid,
                total_umkm: cluster.items.len(),
                nearest_training: matches,
                average_distance,
            }
        })
        .collect()
}

/// One more clustering pass over the union of businesses and attractions,
/// with per-cluster type breakdown and a density label.
pub fn analyze_overall(
    businesses: &[GeoPoint],
    attractions: &[GeoPoint],
    k: Option<usize>,
    config: &KMeansConfig,
) -> Result<OverallAnalysis> {
    let union: Vec<GeoPoint> = businesses
        .iter()
        .map(|p| tagged(p, PointKind::Umkm))
        .chain(attractions.iter().map(|p| tagged(p, PointKind::Wisata)))
        .collect();

    let outcome = cluster_points(&union, k, config)?;

    let analysis = outcome
        .clusters
        .iter()
        .map(|cluster| {
            let umkm = cluster
                .items
                .iter()
                .filter(|i| i.point.kind == Some(PointKind::Umkm))
                .count();
            let wisata = cluster
                .items
                .iter()
                .filter(|i| i.point.kind == Some(PointKind::Wisata))
                .count();
            OverallClusterProfile {
                cluster_id: cluster.id,
                center: cluster.centroid,
                total_items: cluster.items.len(),
                breakdown: TypeBreakdown { umkm, wisata },
                density: density_level(&cluster.items),
            }
        })
        .collect();

    Ok(OverallAnalysis {
        analysis,
        clusters: outcome.clusters,
        centroids: outcome.centroids,
        total_clusters: outcome.cluster_count,
        silhouette_score: outcome.silhouette_score,
    })
}

/// Run the full combined analysis.
///
/// `k = None` lets every clustering pass pick its own count via the
/// silhouette scan; an explicit `k` is used for all passes and stays
/// fixed for the duration of the call.
pub fn analyze_all(
    businesses: &[GeoPoint],
    attractions: &[GeoPoint],
    training_sites: &[GeoPoint],
    k: Option<usize>,
    config: &KMeansConfig,
) -> Result<CombinedAnalysis> {
    debug!(
        "analyze_all: {} businesses, {} attractions, {} training sites, k={:?}",
        businesses.len(),
        attractions.len(),
        training_sites.len(),
        k
    );

    let produk_unggulan = analyze_businesses(businesses, k, config)?;
    let wisata_mikro = analyze_attractions(attractions, k, config)?;
    let training_recommendations = recommend_training(
        &produk_unggulan
            .clusters
            .iter()
            .map(|profile| Cluster {
                id: profile.cluster_id,
                centroid: profile.center,
                items: profile.items.clone(),
            })
            .collect::<Vec<_>>(),
        training_sites,
    );
    let overall_clusters = analyze_overall(businesses, attractions, k, config)?;

    let summary = AnalysisSummary {
        total_umkm: businesses.iter().filter(|p| p.is_valid()).count(),
        total_wisata: attractions.iter().filter(|p| p.is_valid()).count(),
        total_pelatihan: training_sites.iter().filter(|p| p.is_valid()).count(),
        total_clusters: overall_clusters.total_clusters,
        silhouette_score: overall_clusters.silhouette_score,
        method: match k {
            Some(_) => SelectionMethod::Manual,
            None => SelectionMethod::SilhouetteOptimized,
        },
    };

    Ok(CombinedAnalysis {
        produk_unggulan,
        wisata_mikro,
        training_recommendations,
        overall_clusters,
        summary,
    })
}

/// Whether a business category counts as known.
pub fn has_known_category(point: &GeoPoint) -> bool {
    let category = point.category.trim();
    !category.is_empty()
        && !UNKNOWN_CATEGORIES
            .iter()
            .any(|u| category.eq_ignore_ascii_case(u))
}

/// Copy a point into the combined view, tagging its source collection.
fn tagged(point: &GeoPoint, kind: PointKind) -> GeoPoint {
    let mut point = point.clone();
    point.kind = Some(kind);
    point
}

/// Density from the mean member distance to the cluster's mean center:
/// under 1 km Sangat Tinggi, under 3 Tinggi, under 5 Sedang, else Rendah.
fn density_level(items: &[ClusteredPoint]) -> DensityLevel {
    if items.len() < 2 {
        return DensityLevel::Rendah;
    }

    let avg_lat = items.iter().map(|i| i.point.lat).sum::<f64>() / items.len() as f64;
    let avg_lon = items.iter().map(|i| i.point.lon).sum::<f64>() / items.len() as f64;

    let avg_distance = items
        .iter()
        .map(|i| haversine_distance(avg_lat, avg_lon, i.point.lat, i.point.lon))
        .sum::<f64>()
        / items.len() as f64;

    if avg_distance < 1.0 {
        DensityLevel::SangatTinggi
    } else if avg_distance < 3.0 {
        DensityLevel::Tinggi
    } else if avg_distance < 5.0 {
        DensityLevel::Sedang
    } else {
        DensityLevel::Rendah
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
