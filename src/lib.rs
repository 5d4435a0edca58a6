//! # PetaLoka Analytics Engine
//!
//! Geospatial analytics for location intelligence around small businesses
//! (UMKM), micro-tourism attractions (wisata), and training facilities
//! (pelatihan).
//!
//! This library provides:
//! - K-Means clustering of geotagged points with automatic cluster-count
//!   selection via the silhouette coefficient
//! - Combined cluster analysis (featured products, tourism potential,
//!   training recommendations)
//! - Haversine-based competitor and market-saturation analysis
//! - Grid-scan scoring of candidate locations for new businesses
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel grid scanning with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use petaloka::{GeoPoint, KMeansConfig};
//! use petaloka::kmeans::cluster_points;
//!
//! let points = vec![
//!     GeoPoint::new("umkm-1", "Warung Sari", "Kuliner", -6.9147, 107.6098),
//!     GeoPoint::new("umkm-2", "Toko Batik", "Fashion", -6.9150, 107.6102),
//!     GeoPoint::new("umkm-3", "Kedai Kopi", "Kuliner", -6.9042, 107.6208),
//! ];
//!
//! let outcome = cluster_points(&points, Some(2), &KMeansConfig::default()).unwrap();
//! assert_eq!(outcome.clusters.len(), 2);
//! ```
//!
//! All analyses are pure functions of their inputs: no I/O, no shared
//! mutable state, no internal caching. Results are plain `serde`-serializable
//! structures so they can cross the JSON boundary to API handlers and the
//! insight-generation layer unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Unified error handling
pub mod error;
pub use error::{AnalysisError, Result};

// Geographic utilities (haversine distance, bounds, conversions)
pub mod geo_utils;
pub use geo_utils::haversine_distance;

// K-Means clustering with automatic K selection
pub mod kmeans;
pub use kmeans::{cluster_points, Cluster, ClusterOutcome, ClusteredPoint, KMeansConfig};

// Combined clustering analysis (produk unggulan, wisata mikro, pelatihan)
pub mod clustering;
pub use clustering::{analyze_all, CombinedAnalysis};

// Competitor analysis within a radius
pub mod competitor;
pub use competitor::{CompetitorAnalyzer, CompetitorOptions, CompetitorReport};

// Location-potential scoring and grid scanning
pub mod potential;
pub use potential::{
    calculate_location_potential, find_potential_locations, generate_grid_points, GridScanConfig,
    LocationPotential, PotentialConfig,
};

// R-tree point index for radius queries
pub mod spatial;
pub use spatial::PointIndex;

// Synthetic dataset generator (stand-in for the live data sources)
pub mod synthetic;
pub use synthetic::{SyntheticDataset, SyntheticScenario};

// ============================================================================
// Core Types
// ============================================================================

/// Source collection a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Small/micro business.
    Umkm,
    /// Micro-tourism attraction.
    Wisata,
    /// Training/education facility.
    Pelatihan,
}

/// A geotagged point of interest.
///
/// The core fields are `id`, `name`, `category` and the coordinate pair;
/// everything else is passthrough metadata the engine copies forward
/// untouched. Unknown fields survive a serialize round trip via the
/// flattened `extra` map, so enriched records never drop information.
///
/// # Example
/// ```
/// use petaloka::GeoPoint;
/// let point = GeoPoint::new("umkm-1", "Warung Sari", "Kuliner", -6.9147, 107.6098);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub id: String,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lon: f64,
    /// Source collection tag (`"umkm"`, `"wisata"`, `"pelatihan"`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PointKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    /// Any additional metadata, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeoPoint {
    /// Create a point with the required fields only.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            lat,
            lon,
            kind: None,
            address: None,
            phone: None,
            website: None,
            opening_hours: None,
            extra: Map::new(),
        }
    }

    /// Check that the coordinates are finite and in valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lon >= -180.0
            && self.lon <= 180.0
    }

    /// Coordinate pair of this point.
    pub fn coords(&self) -> LatLon {
        LatLon {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// A plain latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A candidate or target location supplied by the caller.
///
/// Target locations keep the `lng` key of the upstream request format,
/// unlike [`GeoPoint`] data records which use `lon`. The asymmetry is
/// intentional and preserved at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TargetLocation {
    /// Create an anonymous target location.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            name: None,
            category: None,
        }
    }

    /// Create a target location with a business category attached.
    pub fn with_category(lat: f64, lng: f64, category: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: None,
            category: Some(category.into()),
        }
    }
}

/// Geographic bounding box for grid scans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Check that the box is finite and not inverted.
    pub fn is_valid(&self) -> bool {
        self.north.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.west.is_finite()
            && self.north >= self.south
            && self.east >= self.west
    }
}

// ============================================================================
// Category Histogram
// ============================================================================

/// One category/count entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Category histogram preserving first-seen insertion order.
///
/// Encounter order matters: the dominant-category tie-break is "earlier
/// seen wins", and the serialized map must be reproducible across runs
/// with identical input. Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    entries: Vec<CategoryCount>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally categories in encounter order.
    pub fn tally<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = Self::new();
        for category in categories {
            counts.increment(category);
        }
        counts
    }

    /// Add one occurrence of `category`, appending it on first sight.
    pub fn increment(&mut self, category: &str) {
        match self.entries.iter_mut().find(|e| e.category == category) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(CategoryCount {
                category: category.to_string(),
                count: 1,
            }),
        }
    }

    /// Count for a category, 0 if absent.
    pub fn get(&self, category: &str) -> usize {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map_or(0, |e| e.count)
    }

    /// Category with the highest count. Ties keep the earlier-seen
    /// category, making the result reproducible for a fixed item order.
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<&CategoryCount> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.count > b.count) {
                best = Some(entry);
            }
        }
        best.map(|e| e.category.as_str())
    }

    /// Entries sorted by count descending, encounter order on ties,
    /// truncated to `n`.
    pub fn top(&self, n: usize) -> Vec<CategoryCount> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(n);
        sorted
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryCount> {
        self.entries.iter()
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.category, &entry.count)?;
        }
        map.end()
    }
}
