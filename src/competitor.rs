//! Competitor analysis within a radius of a target location.
//!
//! Produces a market snapshot for one coordinate: in-radius competitors,
//! density zoning, saturation level, intensity/opportunity scores, a
//! per-category breakdown and strategic recommendation entries. Also
//! supports two-location comparison and category-gap discovery.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::spatial::PointIndex;
use crate::{GeoPoint, TargetLocation};

/// Density zone boundaries in kilometers.
const VERY_CLOSE_KM: f64 = 0.3;
const CLOSE_KM: f64 = 0.7;

/// Options for a competitor analysis request.
#[derive(Debug, Clone)]
pub struct CompetitorOptions {
    /// Search radius in kilometers. Default: 1.0
    pub radius_km: f64,

    /// Keep competitors of every category instead of only the target's.
    /// Default: false
    pub include_all_categories: bool,

    /// Cap on the number of competitors retained after sorting.
    /// Default: 50
    pub max_competitors: usize,
}

impl Default for CompetitorOptions {
    fn default() -> Self {
        Self {
            radius_km: 1.0,
            include_all_categories: false,
            max_competitors: 50,
        }
    }
}

/// Market saturation classification by competitor count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SaturationLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl SaturationLevel {
    /// Classification table: boundaries inclusive on the upper bound of
    /// each band, evaluated in ascending order.
    fn from_count(count: usize) -> Self {
        match count {
            0 => Self::VeryLow,
            1..=3 => Self::Low,
            4..=8 => Self::Moderate,
            9..=15 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::VeryLow => {
                "Tidak ada kompetitor langsung. Bisa jadi peluang atau warning (tidak ada demand)."
            }
            Self::Low => {
                "Kompetisi rendah. Peluang bagus untuk masuk pasar dengan diferensiasi yang jelas."
            }
            Self::Moderate => {
                "Kompetisi sedang. Pasar sudah established, perlu unique value proposition."
            }
            Self::High => {
                "Kompetisi tinggi. Perlu strategi marketing agresif dan diferensiasi kuat."
            }
            Self::VeryHigh => {
                "Pasar sangat kompetitif. Pertimbangkan lokasi lain atau niche market sangat spesifik."
            }
        }
    }
}

impl fmt::Display for SaturationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

/// Kind of strategic recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Warning,
    Opportunity,
    Insight,
    Strategy,
}

/// One strategic recommendation entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
}

/// Competitor counts per distance band. The three bands partition the
/// in-radius competitor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityZones {
    /// Within 0.3 km.
    pub very_close: usize,
    /// Over 0.3 km up to 0.7 km.
    pub close: usize,
    /// Beyond 0.7 km.
    pub moderate: usize,
}

/// Headline figures of a competitor report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSummary {
    pub total_competitors: usize,
    /// Search radius in kilometers.
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub saturation_level: SaturationLevel,
    pub saturation_description: String,
    /// 0-100; rounded to the nearest integer.
    pub intensity_score: f64,
    /// `100 - intensity_score`, so the pair always sums to exactly 100.
    pub opportunity_score: f64,
}

/// Per-category competitor breakdown entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: usize,
    /// Share of all in-radius competitors, rounded percent.
    pub percentage: f64,
    /// Name of the nearest competitor in this category.
    pub nearest: String,
    /// Distance to that competitor in km, 3 decimals.
    pub nearest_distance: f64,
}

/// A nearby competitor, closest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCompetitor {
    pub name: String,
    pub category: String,
    /// Kilometers, 3 decimals.
    pub distance: f64,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub source: String,
}

/// Immutable snapshot of the competitive landscape around one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorReport {
    pub summary: CompetitorSummary,
    pub density_zones: DensityZones,
    pub by_category: Vec<CategoryBreakdown>,
    pub top_competitors: Vec<TopCompetitor>,
    pub recommendations: Vec<Recommendation>,
}

/// Which of the two compared locations wins a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    #[serde(rename = "location1")]
    Location1,
    #[serde(rename = "location2")]
    Location2,
}

/// Side-by-side values for one comparison metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison<T> {
    pub location1: T,
    pub location2: T,
    pub winner: Winner,
}

/// The three metrics used to pick an overall winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonMetrics {
    pub competitors: MetricComparison<usize>,
    pub opportunity: MetricComparison<f64>,
    pub intensity: MetricComparison<f64>,
}

/// A compared location together with its full report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedLocation {
    #[serde(flatten)]
    pub location: TargetLocation,
    pub analysis: CompetitorReport,
}

/// Result of comparing two candidate locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorComparison {
    pub location1: ComparedLocation,
    pub location2: ComparedLocation,
    pub comparison: ComparisonMetrics,
    /// Majority winner (2 of 3 metrics).
    pub winner: Winner,
    pub recommendation: String,
}

/// Opportunity classification for a category gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GapOpportunity {
    #[serde(rename = "High - No competition")]
    High,
    #[serde(rename = "Medium - Low competition")]
    Medium,
    #[serde(rename = "Low - Moderate competition")]
    Low,
    #[serde(rename = "Very Low - High competition")]
    VeryLow,
}

impl GapOpportunity {
    fn from_count(count: usize) -> Self {
        match count {
            0 => Self::High,
            1..=2 => Self::Medium,
            3..=5 => Self::Low,
            _ => Self::VeryLow,
        }
    }
}

/// One category's market-gap assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGap {
    pub category: String,
    pub competitor_count: usize,
    pub opportunity: GapOpportunity,
    /// `max(0, 100 - count * 15)`.
    pub score: f64,
}

/// Market-gap discovery result, best opportunities first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketGapReport {
    pub location: TargetLocation,
    pub radius: f64,
    pub gaps: Vec<CategoryGap>,
    /// Gaps scoring at least 70, at most five entries.
    pub top_opportunities: Vec<CategoryGap>,
}

/// Competitor analyzer over one business dataset.
///
/// Builds a spatial index once at construction; every query afterwards is
/// a pure read. Reports are computed fresh per request and carry no
/// persisted identity.
#[derive(Debug)]
pub struct CompetitorAnalyzer {
    businesses: Vec<GeoPoint>,
    index: PointIndex,
}

impl CompetitorAnalyzer {
    /// Index a business dataset for competitor queries.
    pub fn new(businesses: Vec<GeoPoint>) -> Self {
        let index = PointIndex::new(&businesses);
        Self { businesses, index }
    }

    /// Number of businesses behind this analyzer.
    pub fn business_count(&self) -> usize {
        self.businesses.len()
    }

    /// Analyze the competitive landscape around `target`.
    ///
    /// # Errors
    /// `InvalidRadius` when `options.radius_km` is not a positive number.
    pub fn analyze(
        &self,
        target: &TargetLocation,
        options: &CompetitorOptions,
    ) -> Result<CompetitorReport> {
        if !(options.radius_km > 0.0) {
            return Err(AnalysisError::InvalidRadius(options.radius_km));
        }

        let competitors = self.competitors_in_radius(target, options);
        let total = competitors.len();

        debug!(
            "competitor analysis at ({:.4}, {:.4}): {} within {} km",
            target.lat, target.lng, total, options.radius_km
        );

        let density_zones = DensityZones {
            very_close: competitors
                .iter()
                .filter(|c| c.distance <= VERY_CLOSE_KM)
                .count(),
            close: competitors
                .iter()
                .filter(|c| c.distance > VERY_CLOSE_KM && c.distance <= CLOSE_KM)
                .count(),
            moderate: competitors.iter().filter(|c| c.distance > CLOSE_KM).count(),
        };

        let saturation_level = SaturationLevel::from_count(total);

        // Intensity from count and proximity, opportunity as its inverse.
        // The max(1, total) floor guards the 0/0 case.
        let proximity_factor = (density_zones.very_close * 3
            + density_zones.close * 2
            + density_zones.moderate) as f64
            / total.max(1) as f64;
        let intensity_score = (total as f64 * 5.0 + proximity_factor * 20.0)
            .min(100.0)
            .round();
        let opportunity_score = 100.0 - intensity_score;

        let by_category = category_breakdown(&competitors);
        let recommendations = build_recommendations(
            total,
            &density_zones,
            &by_category,
            target.category.as_deref(),
        );

        let top_competitors = competitors
            .iter()
            .take(10)
            .map(|c| TopCompetitor {
                name: c.point.name.clone(),
                category: c.point.category.clone(),
                distance: round3(c.distance),
                address: c
                    .point
                    .address
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
                lat: c.point.lat,
                lon: c.point.lon,
                source: "umkm".to_string(),
            })
            .collect();

        Ok(CompetitorReport {
            summary: CompetitorSummary {
                total_competitors: total,
                radius: options.radius_km,
                category: target.category.clone(),
                saturation_level,
                saturation_description: saturation_level.description().to_string(),
                intensity_score,
                opportunity_score,
            },
            density_zones,
            by_category,
            top_competitors,
            recommendations,
        })
    }

    /// Compare two candidate locations. Fewer competitors, higher
    /// opportunity and lower intensity each pick a metric winner (ties go
    /// to the second location); the overall winner takes 2 of 3.
    pub fn compare(
        &self,
        location1: &TargetLocation,
        location2: &TargetLocation,
        options: &CompetitorOptions,
    ) -> Result<CompetitorComparison> {
        let analysis1 = self.analyze(location1, options)?;
        let analysis2 = self.analyze(location2, options)?;

        let competitors = MetricComparison {
            location1: analysis1.summary.total_competitors,
            location2: analysis2.summary.total_competitors,
            winner: pick(
                analysis1.summary.total_competitors < analysis2.summary.total_competitors,
            ),
        };
        let opportunity = MetricComparison {
            location1: analysis1.summary.opportunity_score,
            location2: analysis2.summary.opportunity_score,
            winner: pick(
                analysis1.summary.opportunity_score > analysis2.summary.opportunity_score,
            ),
        };
        let intensity = MetricComparison {
            location1: analysis1.summary.intensity_score,
            location2: analysis2.summary.intensity_score,
            winner: pick(analysis1.summary.intensity_score < analysis2.summary.intensity_score),
        };

        let location1_wins = [competitors.winner, opportunity.winner, intensity.winner]
            .iter()
            .filter(|&&w| w == Winner::Location1)
            .count();
        let winner = pick(location1_wins > 3 - location1_wins);

        let recommendation = match winner {
            Winner::Location1 => format!(
                "Lokasi 1 lebih unggul dengan skor opportunity {} vs {}",
                analysis1.summary.opportunity_score, analysis2.summary.opportunity_score
            ),
            Winner::Location2 => format!(
                "Lokasi 2 lebih unggul dengan skor opportunity {} vs {}",
                analysis2.summary.opportunity_score, analysis1.summary.opportunity_score
            ),
        };

        Ok(CompetitorComparison {
            location1: ComparedLocation {
                location: location1.clone(),
                analysis: analysis1,
            },
            location2: ComparedLocation {
                location: location2.clone(),
                analysis: analysis2,
            },
            comparison: ComparisonMetrics {
                competitors,
                opportunity,
                intensity,
            },
            winner,
            recommendation,
        })
    }

    /// Find category gaps: for each category in the supplied universe,
    /// how thin the in-radius competition is.
    pub fn market_gaps(
        &self,
        target: &TargetLocation,
        all_categories: &[String],
        options: &CompetitorOptions,
    ) -> Result<MarketGapReport> {
        let full_options = CompetitorOptions {
            include_all_categories: true,
            ..options.clone()
        };
        let existing = self.analyze(target, &full_options)?;

        let mut gaps: Vec<CategoryGap> = all_categories
            .iter()
            .map(|category| {
                let count = existing
                    .by_category
                    .iter()
                    .find(|c| &c.category == category)
                    .map_or(0, |c| c.count);
                CategoryGap {
                    category: category.clone(),
                    competitor_count: count,
                    opportunity: GapOpportunity::from_count(count),
                    score: (100.0 - count as f64 * 15.0).max(0.0),
                }
            })
            .collect();
        gaps.sort_by(|a, b| b.score.total_cmp(&a.score));

        let top_opportunities = gaps
            .iter()
            .filter(|g| g.score >= 70.0)
            .take(5)
            .cloned()
            .collect();

        Ok(MarketGapReport {
            location: target.clone(),
            radius: options.radius_km,
            gaps,
            top_opportunities,
        })
    }

    /// In-radius competitors sorted ascending by distance (input order on
    /// ties), truncated to the configured maximum.
    fn competitors_in_radius(
        &self,
        target: &TargetLocation,
        options: &CompetitorOptions,
    ) -> Vec<RankedCompetitor<'_>> {
        let mut ranked: Vec<RankedCompetitor<'_>> = self
            .index
            .within_radius(target.lat, target.lng, options.radius_km)
            .into_iter()
            .map(|(idx, distance)| RankedCompetitor {
                point: &self.businesses[idx],
                distance,
            })
            .filter(|c| {
                options.include_all_categories
                    || target.category.as_deref() == Some(c.point.category.as_str())
            })
            .collect();

        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(options.max_competitors);
        ranked
    }
}

struct RankedCompetitor<'a> {
    point: &'a GeoPoint,
    distance: f64,
}

fn pick(location1_wins: bool) -> Winner {
    if location1_wins {
        Winner::Location1
    } else {
        Winner::Location2
    }
}

/// Group competitors by category in first-seen order, then sort the
/// breakdown by count descending.
fn category_breakdown(competitors: &[RankedCompetitor<'_>]) -> Vec<CategoryBreakdown> {
    let total = competitors.len();
    let mut breakdown: Vec<CategoryBreakdown> = Vec::new();

    for competitor in competitors {
        let category = if competitor.point.category.is_empty() {
            "Uncategorized"
        } else {
            competitor.point.category.as_str()
        };
        match breakdown.iter_mut().find(|b| b.category == category) {
            Some(entry) => entry.count += 1,
            None => breakdown.push(CategoryBreakdown {
                category: category.to_string(),
                count: 1,
                percentage: 0.0,
                // Competitors arrive sorted, so the first of a category
                // is its nearest
                nearest: competitor.point.name.clone(),
                nearest_distance: round3(competitor.distance),
            }),
        }
    }

    for entry in &mut breakdown {
        entry.percentage = (entry.count as f64 / total as f64 * 100.0).round();
    }
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

/// Fixed recommendation rules over the report figures.
fn build_recommendations(
    total: usize,
    zones: &DensityZones,
    by_category: &[CategoryBreakdown],
    target_category: Option<&str>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if zones.very_close > 3 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Warning,
            title: "High Proximity Competition".to_string(),
            description: format!(
                "{} kompetitor dalam radius 300m. Pertimbangkan diferensiasi produk yang kuat atau lokasi alternatif.",
                zones.very_close
            ),
        });
    } else if zones.very_close == 0 && total > 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Opportunity,
            title: "Strategic Distance".to_string(),
            description: "Tidak ada kompetitor sangat dekat, tapi ada di area sekitar. Posisi strategis untuk menarik customer.".to_string(),
        });
    }

    if by_category.len() > 3 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Insight,
            title: "Diverse Market".to_string(),
            description: format!(
                "Area ini memiliki {} kategori UMKM berbeda. Market yang beragam menandakan area ramai dengan traffic tinggi.",
                by_category.len()
            ),
        });
    }

    if total == 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Warning,
            title: "Zero Competition Alert".to_string(),
            description: "Tidak ada kompetitor mungkin berarti tidak ada demand. Lakukan riset pasar mendalam sebelum membuka usaha.".to_string(),
        });
    } else if total <= 5 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Opportunity,
            title: "Healthy Competition".to_string(),
            description: "Jumlah kompetitor ideal. Ada demand yang terbukti tanpa saturasi berlebihan.".to_string(),
        });
    }

    if let Some(category) = target_category {
        let same_category = by_category
            .iter()
            .find(|b| b.category == category)
            .map_or(0, |b| b.count);
        if same_category > 5 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Strategy,
                title: "Differentiation Required".to_string(),
                description: format!(
                    "{} kompetitor dengan kategori sama. Fokus pada unique selling point seperti kualitas premium, harga kompetitif, atau layanan istimewa.",
                    same_category
                ),
            });
        }
    }

    recommendations
}

/// Round to 3 decimal places (meter precision on kilometer figures).
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
