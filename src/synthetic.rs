//! Synthetic dataset generator for demos, stress testing and benchmarks.
//!
//! Stands in for the live data sources: generates plausible UMKM,
//! wisata and pelatihan points scattered around an origin coordinate,
//! with the metadata fields (address, phone, website, opening hours) the
//! real collections carry.
//!
//! # Example
//!
//! ```rust
//! use petaloka::synthetic::SyntheticScenario;
//!
//! let dataset = SyntheticScenario::default().generate();
//! assert!(dataset.businesses.len() >= 30);
//! assert!(!dataset.attractions.is_empty());
//! ```
//!
//! Generation is fully deterministic under a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::f64::consts::TAU;

use crate::{GeoPoint, LatLon, PointKind};

/// Meters per degree of latitude, used to scatter points in degree space.
const METERS_PER_DEGREE: f64 = 111_320.0;

const UMKM_CATEGORIES: [&str; 10] = [
    "shop",
    "restaurant",
    "cafe",
    "bakery",
    "handicraft",
    "clothing",
    "grocery",
    "furniture",
    "electronics",
    "bookstore",
];

const WISATA_CATEGORIES: [&str; 9] = [
    "museum",
    "park",
    "cafe",
    "restaurant",
    "gallery",
    "viewpoint",
    "garden",
    "cultural_center",
    "theater",
];

const PELATIHAN_CATEGORIES: [&str; 5] = [
    "training",
    "school",
    "community_centre",
    "college",
    "workshop",
];

const NAME_SUFFIXES: [&str; 8] = [
    "Sejahtera", "Makmur", "Berkah", "Jaya", "Mandiri", "Sentosa", "Lestari", "Harapan",
];

const STREET_NAMES: [&str; 8] = [
    "Merdeka",
    "Sudirman",
    "Diponegoro",
    "Asia Afrika",
    "Braga",
    "Cihampelas",
    "Dago",
    "Setiabudi",
];

/// Scenario configuration for generating a synthetic dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticScenario {
    /// Center of the generated area.
    pub origin: LatLon,
    /// Scatter radius in meters.
    pub radius_meters: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            // Bandung city center
            origin: LatLon::new(-6.9147, 107.6098),
            radius_meters: 5000.0,
            seed: 42,
        }
    }
}

/// A complete synthetic dataset, one collection per point type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticDataset {
    pub businesses: Vec<GeoPoint>,
    pub attractions: Vec<GeoPoint>,
    pub training_sites: Vec<GeoPoint>,
}

impl SyntheticScenario {
    /// Generate the dataset: 30-49 businesses, 20-29 attractions and
    /// 10-14 training sites scattered uniformly around the origin.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let business_count = rng.gen_range(30..50);
        let businesses = (0..business_count)
            .map(|i| self.business(i, &mut rng))
            .collect();

        let attraction_count = rng.gen_range(20..30);
        let attractions = (0..attraction_count)
            .map(|i| self.attraction(i, &mut rng))
            .collect();

        let training_count = rng.gen_range(10..15);
        let training_sites = (0..training_count)
            .map(|i| self.training_site(i, &mut rng))
            .collect();

        SyntheticDataset {
            businesses,
            attractions,
            training_sites,
        }
    }

    fn business(&self, i: usize, rng: &mut StdRng) -> GeoPoint {
        let coords = self.scatter(rng);
        let category = UMKM_CATEGORIES[rng.gen_range(0..UMKM_CATEGORIES.len())];

        let mut point = GeoPoint::new(
            format!("umkm-{}", i + 1),
            business_name(category, i, rng),
            category,
            coords.lat,
            coords.lon,
        );
        point.kind = Some(PointKind::Umkm);
        point.address = Some(street_address(rng));
        point.phone = Some(phone_number(rng));
        if rng.gen::<f64>() > 0.7 {
            point.website = Some(format!("https://umkm{}.example.id", i + 1));
        }
        point.opening_hours = Some("08:00-20:00".to_string());
        point.extra.insert(
            "description".to_string(),
            json!(format!(
                "UMKM {category} berkualitas dengan produk lokal unggulan"
            )),
        );
        point
    }

    fn attraction(&self, i: usize, rng: &mut StdRng) -> GeoPoint {
        let coords = self.scatter(rng);
        let category = WISATA_CATEGORIES[rng.gen_range(0..WISATA_CATEGORIES.len())];

        let mut point = GeoPoint::new(
            format!("wisata-{}", i + 1),
            attraction_name(category, i, rng),
            category,
            coords.lat,
            coords.lon,
        );
        point.kind = Some(PointKind::Wisata);
        point.address = Some(street_address(rng));
        point.phone = Some(phone_number(rng));
        if rng.gen::<f64>() > 0.6 {
            point.website = Some(format!("https://wisata{}.example.id", i + 1));
        }
        point.opening_hours = Some("09:00-21:00".to_string());
        point.extra.insert(
            "description".to_string(),
            json!(format!("Destinasi wisata mikro dengan nuansa {category}")),
        );
        point
    }

    fn training_site(&self, i: usize, rng: &mut StdRng) -> GeoPoint {
        let coords = self.scatter(rng);
        let category = PELATIHAN_CATEGORIES[rng.gen_range(0..PELATIHAN_CATEGORIES.len())];

        let mut point = GeoPoint::new(
            format!("pelatihan-{}", i + 1),
            training_name(category, i, rng),
            category,
            coords.lat,
            coords.lon,
        );
        point.kind = Some(PointKind::Pelatihan);
        point.address = Some(street_address(rng));
        point.phone = Some(phone_number(rng));
        point.opening_hours = Some("08:00-17:00".to_string());
        point.extra.insert(
            "description".to_string(),
            json!("Pusat pelatihan keterampilan untuk pelaku UMKM"),
        );
        point
    }

    /// Uniform random offset within the scatter radius.
    fn scatter(&self, rng: &mut StdRng) -> LatLon {
        let angle = rng.gen::<f64>() * TAU;
        let distance = rng.gen::<f64>() * (self.radius_meters / METERS_PER_DEGREE);
        LatLon::new(
            self.origin.lat + distance * angle.cos(),
            self.origin.lon + distance * angle.sin(),
        )
    }
}

fn business_name(category: &str, i: usize, rng: &mut StdRng) -> String {
    let prefix = match category {
        "shop" => "Toko",
        "restaurant" => "Rumah Makan",
        "cafe" => "Kafe",
        "bakery" => "Toko Roti",
        "handicraft" => "Kerajinan",
        "clothing" => "Butik",
        "grocery" => "Warung",
        "furniture" => "Mebel",
        "electronics" => "Elektronik",
        "bookstore" => "Toko Buku",
        _ => "Usaha",
    };
    format!("{} {} {}", prefix, random_suffix(rng), i + 1)
}

fn attraction_name(category: &str, i: usize, rng: &mut StdRng) -> String {
    let prefix = match category {
        "museum" => "Museum",
        "park" => "Taman",
        "cafe" => "Kafe Wisata",
        "restaurant" => "Resto Panorama",
        "gallery" => "Galeri",
        "viewpoint" => "Puncak",
        "garden" => "Kebun",
        "cultural_center" => "Pusat Budaya",
        "theater" => "Teater",
        _ => "Wisata",
    };
    format!("{} {} {}", prefix, random_suffix(rng), i + 1)
}

fn training_name(category: &str, i: usize, rng: &mut StdRng) -> String {
    let prefix = match category {
        "training" => "Balai Latihan Kerja",
        "school" => "Sekolah",
        "community_centre" => "Balai Warga",
        "college" => "Politeknik",
        "workshop" => "Bengkel Pelatihan",
        _ => "Pelatihan",
    };
    format!("{} {} {}", prefix, random_suffix(rng), i + 1)
}

fn random_suffix(rng: &mut StdRng) -> &'static str {
    NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())]
}

fn street_address(rng: &mut StdRng) -> String {
    format!(
        "Jl. {} No. {}",
        STREET_NAMES[rng.gen_range(0..STREET_NAMES.len())],
        rng.gen_range(1..101)
    )
}

fn phone_number(rng: &mut StdRng) -> String {
    format!("+62{}", rng.gen_range(100_000_000u64..1_000_000_000u64))
}
