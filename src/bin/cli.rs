//! petaloka CLI - Run the analytics engine against JSON datasets
//!
//! Usage:
//!   petaloka-cli cluster <data.json> [--clusters <k>] [--output <file>]
//!   petaloka-cli competitors <data.json> --lat <lat> --lng <lng> --category <cat>
//!   petaloka-cli compare <data.json> --lat1 .. --lng1 .. --lat2 .. --lng2 ..
//!   petaloka-cli gaps <data.json> --lat <lat> --lng <lng>
//!   petaloka-cli potential <data.json> [--lat <lat> --lng <lng> | --scan]
//!   petaloka-cli demo [--seed <n>] [--output <file>]
//!
//! Dataset files hold `{"businesses": [...], "attractions": [...],
//! "trainingSites": [...]}` arrays of point records. Results are printed
//! as pretty JSON so they can be piped straight into other tools.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use petaloka::clustering::analyze_all;
use petaloka::competitor::{CompetitorAnalyzer, CompetitorOptions};
use petaloka::potential::{
    calculate_location_potential, find_potential_locations, GridScanConfig, PotentialConfig,
};
use petaloka::synthetic::SyntheticScenario;
use petaloka::{GeoPoint, KMeansConfig, LatLon, TargetLocation};

#[derive(Parser)]
#[command(name = "petaloka-cli")]
#[command(about = "Geospatial analytics for UMKM location intelligence", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the combined clustering analysis
    Cluster {
        /// JSON dataset file
        data: PathBuf,

        /// Fixed cluster count (omit for automatic selection)
        #[arg(short = 'k', long)]
        clusters: Option<usize>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze competitors around a target location
    Competitors {
        /// JSON dataset file
        data: PathBuf,

        #[arg(long)]
        lat: f64,

        #[arg(long)]
        lng: f64,

        /// Business category of the planned venture
        #[arg(short, long)]
        category: String,

        /// Search radius in kilometers
        #[arg(short, long, default_value = "1.0")]
        radius: f64,

        /// Include competitors of every category
        #[arg(long)]
        all_categories: bool,
    },

    /// Compare the competitive landscape of two locations
    Compare {
        /// JSON dataset file
        data: PathBuf,

        #[arg(long)]
        lat1: f64,
        #[arg(long)]
        lng1: f64,
        #[arg(long)]
        lat2: f64,
        #[arg(long)]
        lng2: f64,

        /// Business category of the planned venture
        #[arg(short, long)]
        category: Option<String>,

        /// Search radius in kilometers
        #[arg(short, long, default_value = "1.0")]
        radius: f64,
    },

    /// Find category gaps around a location
    Gaps {
        /// JSON dataset file
        data: PathBuf,

        #[arg(long)]
        lat: f64,

        #[arg(long)]
        lng: f64,

        /// Search radius in kilometers
        #[arg(short, long, default_value = "1.0")]
        radius: f64,
    },

    /// Score a location's potential, or scan the whole area
    Potential {
        /// JSON dataset file
        data: PathBuf,

        /// Candidate latitude (required unless --scan)
        #[arg(long)]
        lat: Option<f64>,

        /// Candidate longitude (required unless --scan)
        #[arg(long)]
        lng: Option<f64>,

        /// Grid-scan the data bounding box for the best locations
        #[arg(long)]
        scan: bool,

        /// Grid spacing in kilometers (scan mode)
        #[arg(long, default_value = "0.5")]
        grid_size: f64,

        /// Number of ranked locations to keep (scan mode)
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Minimum score to keep a candidate (scan mode)
        #[arg(long, default_value = "50.0")]
        min_score: f64,
    },

    /// Generate a synthetic dataset
    Demo {
        /// Origin latitude
        #[arg(long, default_value = "-6.9147", allow_hyphen_values = true)]
        lat: f64,

        /// Origin longitude
        #[arg(long, default_value = "107.6098", allow_hyphen_values = true)]
        lng: f64,

        /// Scatter radius in meters
        #[arg(long, default_value = "5000.0")]
        radius: f64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the dataset to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Input dataset layout.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetFile {
    #[serde(default)]
    businesses: Vec<GeoPoint>,
    #[serde(default)]
    attractions: Vec<GeoPoint>,
    #[serde(default)]
    training_sites: Vec<GeoPoint>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Cluster {
            data,
            clusters,
            output,
        } => {
            let dataset = load_dataset(&data)?;
            let result = analyze_all(
                &dataset.businesses,
                &dataset.attractions,
                &dataset.training_sites,
                clusters,
                &KMeansConfig::default(),
            )?;
            emit(&result, output.as_deref())
        }

        Commands::Competitors {
            data,
            lat,
            lng,
            category,
            radius,
            all_categories,
        } => {
            let dataset = load_dataset(&data)?;
            let analyzer = CompetitorAnalyzer::new(dataset.businesses);
            let target = TargetLocation::with_category(lat, lng, category);
            let options = CompetitorOptions {
                radius_km: radius,
                include_all_categories: all_categories,
                ..CompetitorOptions::default()
            };
            let report = analyzer.analyze(&target, &options)?;
            emit(&report, None)
        }

        Commands::Compare {
            data,
            lat1,
            lng1,
            lat2,
            lng2,
            category,
            radius,
        } => {
            let dataset = load_dataset(&data)?;
            let analyzer = CompetitorAnalyzer::new(dataset.businesses);
            let mut location1 = TargetLocation::new(lat1, lng1);
            let mut location2 = TargetLocation::new(lat2, lng2);
            location1.category = category.clone();
            location2.category = category;
            let options = CompetitorOptions {
                radius_km: radius,
                ..CompetitorOptions::default()
            };
            let comparison = analyzer.compare(&location1, &location2, &options)?;
            emit(&comparison, None)
        }

        Commands::Gaps {
            data,
            lat,
            lng,
            radius,
        } => {
            let dataset = load_dataset(&data)?;
            let categories = category_universe(&dataset.businesses);
            let analyzer = CompetitorAnalyzer::new(dataset.businesses);
            let target = TargetLocation::new(lat, lng);
            let options = CompetitorOptions {
                radius_km: radius,
                ..CompetitorOptions::default()
            };
            let gaps = analyzer.market_gaps(&target, &categories, &options)?;
            emit(&gaps, None)
        }

        Commands::Potential {
            data,
            lat,
            lng,
            scan,
            grid_size,
            top_n,
            min_score,
        } => {
            let dataset = load_dataset(&data)?;
            if scan {
                let config = GridScanConfig {
                    grid_size_km: grid_size,
                    top_n,
                    min_score,
                    ..GridScanConfig::default()
                };
                let ranked = find_potential_locations(
                    &dataset.businesses,
                    &dataset.attractions,
                    &dataset.training_sites,
                    &config,
                )?;
                emit(&ranked, None)
            } else {
                let (lat, lng) = match (lat, lng) {
                    (Some(lat), Some(lng)) => (lat, lng),
                    _ => return Err("either pass --lat and --lng, or use --scan".into()),
                };
                let mut location = TargetLocation::new(lat, lng);
                location.name = Some("Selected Location".to_string());
                let result = calculate_location_potential(
                    &location,
                    &dataset.businesses,
                    &dataset.attractions,
                    &dataset.training_sites,
                    &PotentialConfig::default(),
                )?;
                emit(&result, None)
            }
        }

        Commands::Demo {
            lat,
            lng,
            radius,
            seed,
            output,
        } => {
            let scenario = SyntheticScenario {
                origin: LatLon::new(lat, lng),
                radius_meters: radius,
                seed,
            };
            let dataset = scenario.generate();
            emit(&dataset, output.as_deref())
        }
    }
}

fn load_dataset(path: &PathBuf) -> Result<DatasetFile, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Distinct business categories in encounter order.
fn category_universe(businesses: &[GeoPoint]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for point in businesses {
        if !point.category.is_empty() && !categories.contains(&point.category) {
            categories.push(point.category.clone());
        }
    }
    categories
}

fn emit<T: serde::Serialize>(value: &T, output: Option<&std::path::Path>) -> Result<(), Box<dyn Error>> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }
    Ok(())
}
