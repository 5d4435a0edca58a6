//! R-tree point index for radius queries.
//!
//! Radius lookups run an axis-aligned envelope query in degree space as a
//! cheap prefilter, then confirm each candidate with the exact haversine
//! distance. The envelope always contains the query circle, so the result
//! set is identical to a full linear scan.

use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{haversine_distance, km_to_lat_degrees, km_to_lon_degrees};
use crate::GeoPoint;

/// Index entry: `[lon, lat]` position plus the index of the source record.
#[derive(Debug, Clone)]
struct IndexedPoint {
    position: [f64; 2],
    idx: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Immutable R-tree over a point collection.
///
/// Built once per dataset and queried many times; invalid-coordinate
/// records are left out of the tree.
#[derive(Debug)]
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl PointIndex {
    /// Bulk-load an index over `points`.
    pub fn new(points: &[GeoPoint]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_valid())
            .map(|(idx, p)| IndexedPoint {
                position: [p.lon, p.lat],
                idx,
            })
            .collect();
        let len = entries.len();

        Self {
            tree: RTree::bulk_load(entries),
            len,
        }
    }

    /// Indices and haversine distances (km) of all points within
    /// `radius_km` of the query coordinate, in ascending index order.
    pub fn within_radius(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<(usize, f64)> {
        let lat_buffer = km_to_lat_degrees(radius_km);
        let lon_buffer = km_to_lon_degrees(radius_km, lat);
        let envelope = AABB::from_corners(
            [lng - lon_buffer, lat - lat_buffer],
            [lng + lon_buffer, lat + lat_buffer],
        );

        let mut hits: Vec<(usize, f64)> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|entry| {
                let distance = haversine_distance(lat, lng, entry.position[1], entry.position[0]);
                (distance <= radius_km).then_some((entry.idx, distance))
            })
            .collect();

        // Deterministic order regardless of tree traversal
        hits.sort_by_key(|&(idx, _)| idx);
        hits
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
