/// Vessel feed parsing.
///
/// Vessel position reports carry a free-text ship type; `infer_vessel_type`
/// maps it onto `VesselType` by case-insensitive substring match against a
/// fixed keyword table. Fields are read under their known spellings in the
/// order of the `*_KEYS` tables. Records without an identifier or a numeric
/// position are dropped individually; other fields of the wrong type read
/// as absent.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::ingest::{extract_records, flag_field, id_field, number_field, text_field};
use crate::model::{FeedError, Position, Vessel, VesselType};

/// Keyword table, checked in order; the first hit wins.
const TYPE_KEYWORDS: &[(VesselType, &[&str])] = &[
    (VesselType::WellBoat, &["well", "brønnbåt", "live fish"]),
    (VesselType::Cable, &["cable", "kabel"]),
    (VesselType::Fishing, &["fishing", "fiske", "trawl"]),
    (VesselType::Service, &["service", "supply", "work", "arbeid", "tug"]),
];

/// Infers the vessel category from a free-text ship type.
pub fn infer_vessel_type(ship_type: &str) -> VesselType {
    let lowered = ship_type.to_lowercase();
    TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(vessel_type, _)| *vessel_type)
        .unwrap_or(VesselType::Unknown)
}

// ---------------------------------------------------------------------------
// Field spellings, in precedence order
// ---------------------------------------------------------------------------

const ID_KEYS: &[&str] = &["mmsi", "id"];
const NAME_KEYS: &[&str] = &["name"];
const TYPE_KEYS: &[&str] = &["shipType", "type", "shipTypeName"];
const LAT_KEYS: &[&str] = &["latitude", "lat"];
const LNG_KEYS: &[&str] = &["longitude", "lon", "lng"];
const HEADING_KEYS: &[&str] = &["trueHeading", "heading"];
const COURSE_KEYS: &[&str] = &["courseOverGround"];
const SPEED_KEYS: &[&str] = &["speedOverGround", "speedKnots", "speed"];
const RISK_ZONE_KEYS: &[&str] = &["passedRiskZone"];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ParsedVessels {
    pub vessels: Vec<Vessel>,
    pub dropped: usize,
}

/// Parses a vessel feed body, in feed order.
///
/// # Errors
/// - `FeedError::Parse` — body is not a recognisable JSON payload.
/// - `FeedError::EmptyPayload` — no records, or none survived validation.
pub fn parse_vessels(json: &str) -> Result<ParsedVessels, FeedError> {
    let records = extract_records(json)?;
    let total = records.len();

    let mut seen = HashSet::new();
    let vessels: Vec<Vessel> = records
        .into_iter()
        .filter_map(record_to_vessel)
        .filter(|v| seen.insert(v.id.clone()))
        .collect();

    if vessels.is_empty() {
        return Err(FeedError::EmptyPayload);
    }

    Ok(ParsedVessels {
        dropped: total - vessels.len(),
        vessels,
    })
}

fn record_to_vessel(value: Value) -> Option<Vessel> {
    let Value::Object(record) = value else {
        debug!("dropping non-object vessel record");
        return None;
    };

    let id = id_field(&record, ID_KEYS)?;
    let lat = number_field(&record, LAT_KEYS)?;
    let lng = number_field(&record, LNG_KEYS)?;

    // Some revisions send the ship type as a numeric AIS code.
    let vessel_type = text_field(&record, TYPE_KEYS)
        .or_else(|| id_field(&record, TYPE_KEYS))
        .map(|t| infer_vessel_type(&t))
        .unwrap_or(VesselType::Unknown);

    Some(Vessel {
        name: text_field(&record, NAME_KEYS).unwrap_or_else(|| format!("MMSI {}", id)),
        id,
        vessel_type,
        position: Position::new(lat, lng),
        heading: normalize_heading(
            number_field(&record, HEADING_KEYS),
            number_field(&record, COURSE_KEYS),
        ),
        speed_knots: number_field(&record, SPEED_KEYS).unwrap_or(0.0).max(0.0),
        passed_risk_zone: flag_field(&record, RISK_ZONE_KEYS).unwrap_or(false),
    })
}

/// True heading when reported (AIS uses 511 for "not available"), else
/// course over ground, else 0.
fn normalize_heading(true_heading: Option<f64>, course: Option<f64>) -> u16 {
    let valid = |h: &f64| (0.0..360.0).contains(h);
    true_heading
        .filter(valid)
        .or_else(|| course.filter(valid))
        .map(|h| (h.round() as u16) % 360)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
