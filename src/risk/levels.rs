/// Risk level classification and the per-site output contract.
///
/// `RiskLevel` partitions 1..=10 into four bands and `RiskColor` is the
/// single lookup every presentation surface must use, so a site never shows
/// as orange on the map and red in the report.

use serde::Serialize;

use crate::model::{Position, Site, Vessel};
use crate::risk::scoring;

// ---------------------------------------------------------------------------
// Levels and colours
// ---------------------------------------------------------------------------

/// Risk levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// `>= 8` critical, `>= 6` high, `>= 4` medium, otherwise low.
    pub fn from_score(score: u8) -> Self {
        if score >= 8 {
            RiskLevel::Critical
        } else if score >= 6 {
            RiskLevel::High
        } else if score >= 4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn color(&self) -> RiskColor {
        match self {
            RiskLevel::Critical => RiskColor::Red,
            RiskLevel::High => RiskColor::Orange,
            RiskLevel::Medium => RiskColor::Yellow,
            RiskLevel::Low => RiskColor::Green,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }

    /// Highest first, for reports.
    pub const DESCENDING: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];
}

/// Colour token consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Red,
    Orange,
    Yellow,
    Green,
}

impl RiskColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskColor::Red => "red",
            RiskColor::Orange => "orange",
            RiskColor::Yellow => "yellow",
            RiskColor::Green => "green",
        }
    }
}

// ---------------------------------------------------------------------------
// Output contract
// ---------------------------------------------------------------------------

/// `{ score, level, color }` for one scoring layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteRisk {
    pub score: u8,
    pub level: RiskLevel,
    pub color: RiskColor,
}

impl SiteRisk {
    pub fn from_score(score: u8) -> Self {
        let level = RiskLevel::from_score(score);
        Self { score, level, color: level.color() }
    }
}

/// Everything the presentation layer receives about one site. Scoring
/// internals (breakdowns, raw measurements) stay behind this boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAssessment {
    pub site_id: String,
    pub name: String,
    pub region_id: u8,
    pub position: Position,
    pub current: SiteRisk,
    pub predictive: SiteRisk,
    pub future: SiteRisk,
}

pub fn assess(site: &Site, all_sites: &[Site], vessels: &[Vessel]) -> SiteAssessment {
    SiteAssessment {
        site_id: site.id.clone(),
        name: site.name.clone(),
        region_id: site.region_id,
        position: site.position,
        current: SiteRisk::from_score(scoring::score(site)),
        predictive: SiteRisk::from_score(scoring::predictive(site, all_sites, vessels)),
        future: SiteRisk::from_score(scoring::future(site, all_sites, vessels)),
    }
}

/// Assesses every site against the full site and vessel sets, keeping the
/// input order.
pub fn assess_all(sites: &[Site], vessels: &[Vessel]) -> Vec<SiteAssessment> {
    sites.iter().map(|site| assess(site, sites, vessels)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
