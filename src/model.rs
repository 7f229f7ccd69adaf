/// Core data types for the aquaculture risk service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and only trivial derived accessors. Scoring lives in
/// `risk`, coordinate correction in `geo`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Thresholds used by derived accessors
// ---------------------------------------------------------------------------

/// Chlorophyll concentration (µg/L) above which a site is flagged for
/// harmful-algae risk.
pub const ALGAE_CHLOROPHYLL_THRESHOLD: f64 = 10.0;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

/// Notifiable disease category reported for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseCode {
    A,
    B,
    C,
}

impl DiseaseCode {
    /// Parses a feed value such as `"A"` or `" b "`. Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(DiseaseCode::A),
            "B" => Some(DiseaseCode::B),
            "C" => Some(DiseaseCode::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseCode::A => "A",
            DiseaseCode::B => "B",
            DiseaseCode::C => "C",
        }
    }
}

/// A monitored aquaculture facility as of one acquisition cycle.
///
/// Sites are built fresh on every cycle and never mutated afterwards; a
/// refresh replaces the whole collection. `position` is always the output
/// of `geo::Corrector`, never the raw feed coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Locality number from the external registry. Stable across cycles.
    pub id: String,
    pub name: String,
    /// Production region, 1..=13.
    pub region_id: u8,
    pub position: Position,
    /// Adult female parasites per host.
    pub parasite_load: f64,
    /// Sea temperature, °C.
    pub water_temp: Option<f64>,
    /// Parts per thousand. Reported but not scored.
    pub salinity: Option<f64>,
    /// More than 30% rise over the trailing window.
    pub load_increasing: bool,
    pub nearby_high_load_neighbor: bool,
    /// Direction the water flows toward, degrees clockwise from north.
    pub current_direction: Option<f64>,
    /// m/s
    pub current_speed: Option<f64>,
    /// µg/L
    pub chlorophyll: Option<f64>,
    pub forced_cull: Option<bool>,
    pub disease_code: Option<DiseaseCode>,
    pub in_quarantine: Option<bool>,
}

impl Site {
    pub fn has_algae_risk(&self) -> bool {
        self.chlorophyll
            .is_some_and(|c| c > ALGAE_CHLOROPHYLL_THRESHOLD)
    }

    pub fn has_disease(&self) -> bool {
        self.disease_code.is_some()
    }

    pub fn is_in_quarantine(&self) -> bool {
        self.in_quarantine.unwrap_or(false)
    }

    pub fn is_forced_cull(&self) -> bool {
        self.forced_cull.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Vessels
// ---------------------------------------------------------------------------

/// Coarse vessel category inferred from the free-text ship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VesselType {
    WellBoat,
    Service,
    Fishing,
    Cable,
    Unknown,
}

/// A vessel position report.
///
/// Only `passed_risk_zone` feeds the scoring engine; the remaining fields
/// are carried for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub vessel_type: VesselType,
    pub position: Position,
    /// 0..=359
    pub heading: u16,
    pub speed_knots: f64,
    /// Entered a designated high-risk zone within the trailing 7 days.
    pub passed_risk_zone: bool,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding an external feed.
///
/// None of these ever reach a caller of `acquisition::Acquirer`; they are
/// absorbed by the fallback chain and only logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Network failure or timeout before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The body was empty, or no record in it survived validation.
    #[error("empty payload")]
    EmptyPayload,
    /// The body was not the expected JSON shape.
    #[error("parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn sample_site(id: &str, lat: f64, lng: f64) -> Site {
    Site {
        id: id.to_string(),
        name: format!("Site {}", id),
        region_id: 4,
        position: Position::new(lat, lng),
        parasite_load: 0.0,
        water_temp: None,
        salinity: None,
        load_increasing: false,
        nearby_high_load_neighbor: false,
        current_direction: None,
        current_speed: None,
        chlorophyll: None,
        forced_cull: None,
        disease_code: None,
        in_quarantine: None,
    }
}

#[cfg(test)]
pub(crate) fn sample_vessel(id: &str, lat: f64, lng: f64, passed_risk_zone: bool) -> Vessel {
    Vessel {
        id: id.to_string(),
        name: format!("Vessel {}", id),
        vessel_type: VesselType::WellBoat,
        position: Position::new(lat, lng),
        heading: 0,
        speed_knots: 0.0,
        passed_risk_zone,
    }
}
