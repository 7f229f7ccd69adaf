/// Rule-based site risk scoring.
///
/// Three layered scores, each an integer in 1..=10:
///
/// - `score`      — current risk from the site's own measurements.
/// - `predictive` — `score` plus exposure to diseased neighbours, upstream
///                  water currents and vessels that passed a risk zone.
/// - `future`     — `predictive` plus a one-to-two week horizon adjustment
///                  for temperature and region-wide spread.
///
/// Every layer starts from the clamped result of the layer below and only
/// adds non-negative contributions, so `future >= predictive >= score`.
/// Each point is traceable through `ScoreBreakdown`.
///
/// Two quirks are preserved on purpose and pinned by tests:
/// the current score rewards `parasite_load` twice (linear term and the
/// 0.5 threshold bonus), and the future vessel term is +1 per vessel where
/// the predictive vessel term is +1.5.

use serde::Serialize;

use crate::geo::{angular_difference, bearing_deg, degree_distance};
use crate::model::{Site, Vessel};

// ---------------------------------------------------------------------------
// Rule constants
// ---------------------------------------------------------------------------

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// ~30 km in unprojected degrees.
pub const NEAR_RADIUS_DEG: f64 = 0.27;
/// ~50 km in unprojected degrees.
pub const WIDE_RADIUS_DEG: f64 = 0.5;

/// Half-angle of the cone around `current_direction` inside which a
/// neighbour counts as upstream.
pub const CURRENT_CONE_HALF_ANGLE_DEG: f64 = 45.0;

const LOAD_MULTIPLIER: f64 = 10.0;
const WARM_WATER_TEMP: f64 = 8.0;
const LOAD_THRESHOLD: f64 = 0.5;

const THERMAL_OPTIMUM_MIN: f64 = 7.0;
const THERMAL_OPTIMUM_MAX: f64 = 15.0;
const MAX_REGIONAL_DISEASE_CREDIT: usize = 3;

// ---------------------------------------------------------------------------
// Breakdown types
// ---------------------------------------------------------------------------

/// The rule that produced a contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RiskFactor {
    ParasiteLoad,
    WarmWater,
    LoadAboveThreshold,
    Disease,
    Quarantine,
    AlgaeRisk,
    DiseasedNeighbor { site_id: String },
    UpstreamDiseasedNeighbor { site_id: String },
    RiskZoneVessel { vessel_id: String },
    ThermalOptimum,
    ThermalStress,
    RegionalDisease { neighbors: usize },
    RegionalRiskZoneVessel { vessel_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub factor: RiskFactor,
    pub points: f64,
}

/// Every rule contribution behind one score.
///
/// `base` is the clamped score of the layer below (`None` for the current
/// score, which starts from zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: Option<u8>,
    pub contributions: Vec<Contribution>,
}

impl ScoreBreakdown {
    fn starting_at(base: Option<u8>) -> Self {
        Self { base, contributions: Vec::new() }
    }

    fn add(&mut self, factor: RiskFactor, points: f64) {
        if points > 0.0 {
            self.contributions.push(Contribution { factor, points });
        }
    }

    /// Unrounded, unclamped sum.
    pub fn raw(&self) -> f64 {
        let base = self.base.map(f64::from).unwrap_or(0.0);
        base + self.contributions.iter().map(|c| c.points).sum::<f64>()
    }

    /// Rounded and clamped to 1..=10.
    pub fn score(&self) -> u8 {
        clamp_score(self.raw())
    }
}

/// Rounds half away from zero and clamps to 1..=10. Non-finite input
/// yields the minimum.
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return MIN_SCORE;
    }
    raw.round()
        .clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8
}

// ---------------------------------------------------------------------------
// Current score
// ---------------------------------------------------------------------------

pub fn score_breakdown(site: &Site) -> ScoreBreakdown {
    let load = sanitized_load(site.parasite_load);
    let mut breakdown = ScoreBreakdown::starting_at(None);

    breakdown.add(RiskFactor::ParasiteLoad, load * LOAD_MULTIPLIER);
    if site.water_temp.is_some_and(|t| t > WARM_WATER_TEMP) {
        breakdown.add(RiskFactor::WarmWater, 2.0);
    }
    if load > LOAD_THRESHOLD {
        breakdown.add(RiskFactor::LoadAboveThreshold, 2.0);
    }

    breakdown
}

/// Current risk score, 1..=10.
pub fn score(site: &Site) -> u8 {
    score_breakdown(site).score()
}

fn sanitized_load(load: f64) -> f64 {
    if load.is_finite() { load.max(0.0) } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Predictive score
// ---------------------------------------------------------------------------

pub fn predictive_breakdown(site: &Site, all_sites: &[Site], vessels: &[Vessel]) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::starting_at(Some(score(site)));

    if site.has_disease() {
        breakdown.add(RiskFactor::Disease, 3.0);
    }
    if site.is_in_quarantine() {
        breakdown.add(RiskFactor::Quarantine, 2.0);
    }
    if site.has_algae_risk() {
        breakdown.add(RiskFactor::AlgaeRisk, 2.0);
    }

    for neighbor in diseased_neighbors(site, all_sites, NEAR_RADIUS_DEG) {
        breakdown.add(
            RiskFactor::DiseasedNeighbor { site_id: neighbor.id.clone() },
            2.0,
        );
        if is_upstream(site, neighbor) {
            breakdown.add(
                RiskFactor::UpstreamDiseasedNeighbor { site_id: neighbor.id.clone() },
                1.5,
            );
        }
    }

    for vessel in risk_zone_vessels(site, vessels, NEAR_RADIUS_DEG) {
        breakdown.add(
            RiskFactor::RiskZoneVessel { vessel_id: vessel.id.clone() },
            1.5,
        );
    }

    breakdown
}

/// Current score plus neighbourhood exposure, 1..=10.
pub fn predictive(site: &Site, all_sites: &[Site], vessels: &[Vessel]) -> u8 {
    predictive_breakdown(site, all_sites, vessels).score()
}

/// A diseased neighbour is upstream when the bearing from it to the site
/// lies within the cone around the direction the site's current flows.
fn is_upstream(site: &Site, neighbor: &Site) -> bool {
    let Some(direction) = site.current_direction.filter(|d| d.is_finite()) else {
        return false;
    };
    let inflow = bearing_deg(&neighbor.position, &site.position);
    angular_difference(inflow, direction) <= CURRENT_CONE_HALF_ANGLE_DEG
}

// ---------------------------------------------------------------------------
// Future score
// ---------------------------------------------------------------------------

pub fn future_breakdown(site: &Site, all_sites: &[Site], vessels: &[Vessel]) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::starting_at(Some(predictive(site, all_sites, vessels)));

    if let Some(temp) = site.water_temp {
        if (THERMAL_OPTIMUM_MIN..=THERMAL_OPTIMUM_MAX).contains(&temp) {
            breakdown.add(RiskFactor::ThermalOptimum, 2.0);
        } else if temp > THERMAL_OPTIMUM_MAX {
            breakdown.add(RiskFactor::ThermalStress, 1.0);
        }
    }

    let diseased = diseased_neighbors(site, all_sites, WIDE_RADIUS_DEG).count();
    let credited = diseased.min(MAX_REGIONAL_DISEASE_CREDIT);
    breakdown.add(
        RiskFactor::RegionalDisease { neighbors: diseased },
        credited as f64,
    );

    for vessel in risk_zone_vessels(site, vessels, WIDE_RADIUS_DEG) {
        breakdown.add(
            RiskFactor::RegionalRiskZoneVessel { vessel_id: vessel.id.clone() },
            1.0,
        );
    }

    breakdown
}

/// Predictive score plus the 1–2 week horizon adjustment, 1..=10.
pub fn future(site: &Site, all_sites: &[Site], vessels: &[Vessel]) -> u8 {
    future_breakdown(site, all_sites, vessels).score()
}

// ---------------------------------------------------------------------------
// Neighbourhood queries
// ---------------------------------------------------------------------------

fn diseased_neighbors<'a>(
    site: &'a Site,
    all_sites: &'a [Site],
    radius_deg: f64,
) -> impl Iterator<Item = &'a Site> + 'a {
    all_sites.iter().filter(move |other| {
        other.id != site.id
            && other.has_disease()
            && degree_distance(&site.position, &other.position) < radius_deg
    })
}

fn risk_zone_vessels<'a>(
    site: &'a Site,
    vessels: &'a [Vessel],
    radius_deg: f64,
) -> impl Iterator<Item = &'a Vessel> + 'a {
    vessels.iter().filter(move |vessel| {
        vessel.passed_risk_zone
            && degree_distance(&site.position, &vessel.position) < radius_deg
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
