// Rule-based performance score and rank tier
use super::aggregate::BaseAverages;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Band matches when the average is strictly greater than its threshold.
    Above,
    /// Band matches when the average is strictly less than its threshold.
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub threshold: i64,
    pub points: u32,
    pub reason: String,
}

impl Band {
    fn new(threshold: i64, points: u32, reason: &str) -> Self {
        Self {
            threshold,
            points,
            reason: reason.to_string(),
        }
    }
}

/// Thresholds for one scoring category. Among the bands the value clears, the
/// tightest one wins (highest threshold for `Above`, lowest for `Below`), so
/// configured band order does not matter. The fallback applies when none match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub direction: Direction,
    pub bands: Vec<Band>,
    pub fallback_points: u32,
    pub fallback_reason: String,
}

impl CategoryRule {
    fn new(direction: Direction, bands: Vec<Band>, fallback_points: u32, fallback_reason: &str) -> Self {
        Self {
            direction,
            bands,
            fallback_points,
            fallback_reason: fallback_reason.to_string(),
        }
    }

    pub fn evaluate(&self, value: i64) -> ScoreComponent {
        let matching = self.bands.iter().filter(|band| match self.direction {
            Direction::Above => value > band.threshold,
            Direction::Below => value < band.threshold,
        });
        let best = match self.direction {
            Direction::Above => matching.max_by_key(|band| band.threshold),
            Direction::Below => matching.min_by_key(|band| band.threshold),
        };

        best.map(|band| ScoreComponent::new(band.points, &band.reason))
            .unwrap_or_else(|| ScoreComponent::new(self.fallback_points, &self.fallback_reason))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankTier {
    Platinum,
    Gold,
    Silver,
    Bronze,
}

pub const PLATINUM_COLOR: &str = "#E5E4E2";
pub const GOLD_COLOR: &str = "#FFD700";
pub const SILVER_COLOR: &str = "#C0C0C0";
pub const BRONZE_COLOR: &str = "#CD7F32";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub tier: RankTier,
    /// Inclusive lower bound on total points.
    pub min_points: u32,
    pub color: String,
}

impl TierRule {
    fn new(tier: RankTier, min_points: u32, color: &str) -> Self {
        Self {
            tier,
            min_points,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub speed: CategoryRule,
    pub rpm: CategoryRule,
    pub fuel: CategoryRule,
    pub temperature: CategoryRule,
    pub tiers: Vec<TierRule>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            speed: CategoryRule::new(
                Direction::Above,
                vec![
                    Band::new(180, 30, "Blistering pace above 180 MPH"),
                    Band::new(150, 25, "Strong pace above 150 MPH"),
                    Band::new(120, 15, "Solid pace above 120 MPH"),
                ],
                5,
                "Pace at or below 120 MPH",
            ),
            rpm: CategoryRule::new(
                Direction::Below,
                vec![
                    Band::new(7500, 20, "Efficient engine use below 7500 RPM"),
                    Band::new(8500, 15, "Moderate engine load below 8500 RPM"),
                ],
                5,
                "High engine load at or above 8500 RPM",
            ),
            fuel: CategoryRule::new(
                Direction::Above,
                vec![
                    Band::new(60, 25, "Excellent fuel reserve above 60%"),
                    Band::new(50, 20, "Good fuel reserve above 50%"),
                    Band::new(30, 10, "Adequate fuel reserve above 30%"),
                ],
                5,
                "Low fuel reserve at or below 30%",
            ),
            temperature: CategoryRule::new(
                Direction::Below,
                vec![
                    Band::new(180, 25, "Optimal temperature below 180°F"),
                    Band::new(200, 20, "Good temperature below 200°F"),
                    Band::new(220, 10, "Running warm below 220°F"),
                ],
                5,
                "Overheating at or above 220°F",
            ),
            tiers: vec![
                TierRule::new(RankTier::Platinum, 85, PLATINUM_COLOR),
                TierRule::new(RankTier::Gold, 70, GOLD_COLOR),
                TierRule::new(RankTier::Silver, 50, SILVER_COLOR),
                TierRule::new(RankTier::Bronze, 0, BRONZE_COLOR),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub points: u32,
    pub reason: String,
}

impl ScoreComponent {
    fn new(points: u32, reason: &str) -> Self {
        Self {
            points,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceScore {
    pub points: u32,
    pub rank: RankTier,
    pub color: String,
    pub breakdown: BTreeMap<String, ScoreComponent>,
}

impl ScoringRules {
    pub fn score(&self, averages: &BaseAverages) -> PerformanceScore {
        let breakdown: BTreeMap<String, ScoreComponent> = [
            ("speed", self.speed.evaluate(averages.avg_speed)),
            ("rpm", self.rpm.evaluate(averages.avg_rpm)),
            ("fuel", self.fuel.evaluate(averages.avg_fuel)),
            ("temperature", self.temperature.evaluate(averages.avg_temp)),
        ]
        .into_iter()
        .map(|(category, component)| (category.to_string(), component))
        .collect();

        let points = breakdown.values().map(|c| c.points).sum();
        let (rank, color) = self.rank_for(points);

        PerformanceScore {
            points,
            rank,
            color,
            breakdown,
        }
    }

    /// Highest tier whose floor `points` reaches.
    pub fn rank_for(&self, points: u32) -> (RankTier, String) {
        self.tiers
            .iter()
            .filter(|t| points >= t.min_points)
            .max_by_key(|t| t.min_points)
            .map(|t| (t.tier, t.color.clone()))
            .unwrap_or((RankTier::Bronze, BRONZE_COLOR.to_string()))
    }
}

/// Score with the stock rule table.
pub fn score_performance(averages: &BaseAverages) -> PerformanceScore {
    ScoringRules::default().score(averages)
}
