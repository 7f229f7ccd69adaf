/// Site feed parsing.
///
/// Turns the weekly locality feed into `Site`s. Field names vary between
/// feed revisions, so each field is read under its known spellings in a
/// fixed precedence (`ID_KEYS` etc.). A record is retained only if it
/// carries a numeric latitude, a numeric longitude and a locality
/// identifier. Optional fields of the wrong type read as absent. A record
/// that fails these checks is dropped on its own and never fails the fetch.
///
/// Every retained record's coordinate goes through `geo::Corrector` before
/// the `Site` is built.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::geo::Corrector;
use crate::ingest::{extract_records, flag_field, id_field, number_field, text_field};
use crate::model::{DiseaseCode, FeedError, Site};
use crate::regions::{is_valid_region_id, region_for_position};

/// Relative rise over the previous period that marks the load as increasing.
const LOAD_INCREASE_RATIO: f64 = 1.3;

// ---------------------------------------------------------------------------
// Field spellings, in precedence order
// ---------------------------------------------------------------------------

const ID_KEYS: &[&str] = &["localityNo", "locality_no", "id"];
const NAME_KEYS: &[&str] = &["name", "localityName"];
const LAT_KEYS: &[&str] = &["lat", "latitude"];
const LNG_KEYS: &[&str] = &["lng", "lon", "longitude"];
const LOAD_KEYS: &[&str] = &["adultFemaleLice", "avgAdultFemaleLice"];
const PREVIOUS_LOAD_KEYS: &[&str] = &["previousAdultFemaleLice"];
const TEMP_KEYS: &[&str] = &["temperature", "seaTemperature"];
const SALINITY_KEYS: &[&str] = &["salinity"];
const REGION_KEYS: &[&str] = &["productionArea", "po", "productionAreaId"];
const INCREASE_KEYS: &[&str] = &["hasLiceIncrease", "liceIncrease"];
const NEIGHBOR_KEYS: &[&str] = &["highLiceNeighbor"];
const DIRECTION_KEYS: &[&str] = &["currentDirection"];
const SPEED_KEYS: &[&str] = &["currentSpeed"];
const CHLOROPHYLL_KEYS: &[&str] = &["chlorophyll"];
const CULL_KEYS: &[&str] = &["forcedSlaughter", "forcedCull"];
const DISEASE_KEYS: &[&str] = &["disease", "diseaseCode"];
const QUARANTINE_KEYS: &[&str] = &["inQuarantine"];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Result of parsing one site feed body.
#[derive(Debug)]
pub struct ParsedSites {
    pub sites: Vec<Site>,
    /// Records dropped for missing or malformed required fields, or for
    /// repeating an earlier locality number.
    pub dropped: usize,
}

/// Parses a site feed body into corrected `Site`s, in feed order.
///
/// # Errors
/// - `FeedError::Parse` — body is not a recognisable JSON payload.
/// - `FeedError::EmptyPayload` — no records, or none survived validation.
pub fn parse_sites(json: &str, corrector: &Corrector) -> Result<ParsedSites, FeedError> {
    let records = extract_records(json)?;
    let total = records.len();

    let mut seen = HashSet::new();
    let mut sites = Vec::with_capacity(total);

    for value in records {
        let Some(site) = record_to_site(value, corrector) else {
            continue;
        };
        if seen.insert(site.id.clone()) {
            sites.push(site);
        } else {
            debug!(site_id = %site.id, "dropping repeated locality");
        }
    }

    if sites.is_empty() {
        return Err(FeedError::EmptyPayload);
    }

    Ok(ParsedSites {
        dropped: total - sites.len(),
        sites,
    })
}

fn record_to_site(value: Value, corrector: &Corrector) -> Option<Site> {
    let Value::Object(record) = value else {
        debug!("dropping non-object site record");
        return None;
    };

    let id = id_field(&record, ID_KEYS)?;
    let lat = number_field(&record, LAT_KEYS)?;
    let lng = number_field(&record, LNG_KEYS)?;

    let position = corrector.correct(lat, lng);
    let region_id = number_field(&record, REGION_KEYS)
        .filter(|po| po.fract() == 0.0 && is_valid_region_id(*po as i64))
        .map(|po| po as u8)
        .unwrap_or_else(|| region_for_position(position.lat, position.lng));

    let parasite_load = number_field(&record, LOAD_KEYS).unwrap_or(0.0).max(0.0);

    let load_increasing = match number_field(&record, PREVIOUS_LOAD_KEYS) {
        Some(previous) if previous > 0.0 => parasite_load > previous * LOAD_INCREASE_RATIO,
        _ => flag_field(&record, INCREASE_KEYS).unwrap_or(false),
    };

    Some(Site {
        name: text_field(&record, NAME_KEYS).unwrap_or_else(|| format!("Lokalitet {}", id)),
        id,
        region_id,
        position,
        parasite_load,
        water_temp: number_field(&record, TEMP_KEYS),
        salinity: number_field(&record, SALINITY_KEYS),
        load_increasing,
        nearby_high_load_neighbor: flag_field(&record, NEIGHBOR_KEYS).unwrap_or(false),
        current_direction: number_field(&record, DIRECTION_KEYS).map(|d| d.rem_euclid(360.0)),
        current_speed: number_field(&record, SPEED_KEYS),
        chlorophyll: number_field(&record, CHLOROPHYLL_KEYS),
        forced_cull: flag_field(&record, CULL_KEYS),
        disease_code: text_field(&record, DISEASE_KEYS).and_then(|c| DiseaseCode::parse(&c)),
        in_quarantine: flag_field(&record, QUARANTINE_KEYS),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use crate::model::Position;

    fn parse(json: &str) -> Result<ParsedSites, FeedError> {
        parse_sites(json, &Corrector::default())
    }

    #[test]
    fn test_parse_bare_array_fixture() {
        let parsed = parse(fixture_sites_array_json()).expect("fixture should parse");
        assert_eq!(parsed.sites.len(), 3);
        assert_eq!(parsed.dropped, 0);

        let hardanger = parsed
            .sites
            .iter()
            .find(|s| s.id == "12345")
            .expect("numeric locality number should become a string id");
        assert_eq!(hardanger.name, "Hardanger Nord");
        assert_eq!(hardanger.region_id, 3);
        assert!((hardanger.parasite_load - 0.42).abs() < 1e-9);
        assert_eq!(hardanger.water_temp, Some(9.4));
        assert_eq!(hardanger.salinity, Some(31.2));
        assert_eq!(hardanger.disease_code, Some(DiseaseCode::A));
        assert_eq!(hardanger.in_quarantine, Some(true));
    }

    #[test]
    fn test_positions_are_corrected_not_raw() {
        let parsed = parse(fixture_sites_array_json()).expect("fixture should parse");
        let site = parsed.sites.iter().find(|s| s.id == "12345").expect("present");
        let raw = Position::new(60.31, 6.22);
        assert_ne!(site.position, raw, "stored position must not be the raw coordinate");
        assert_eq!(site.position, Corrector::default().correct(raw.lat, raw.lng));
    }

    #[test]
    fn test_paginated_envelope_fixture() {
        let parsed = parse(fixture_sites_paginated_json()).expect("paginated should parse");
        assert_eq!(parsed.sites.len(), 2);
        assert!(parsed.sites.iter().any(|s| s.id == "42"));
    }

    #[test]
    fn test_records_missing_required_fields_are_dropped() {
        let parsed = parse(fixture_sites_with_bad_records_json()).expect("good records survive");
        assert_eq!(parsed.sites.len(), 1, "only the complete record should be kept");
        assert_eq!(parsed.sites[0].id, "777");
        assert_eq!(parsed.dropped, 4);
    }

    #[test]
    fn test_all_records_invalid_is_empty_payload() {
        let json = r#"[{"name":"no coords","localityNo":"1"},{"lat":60.0,"lng":5.0}]"#;
        assert_eq!(parse(json).map(|p| p.sites.len()), Err(FeedError::EmptyPayload));
    }

    #[test]
    fn test_repeated_locality_keeps_first() {
        let json = r#"[
            {"localityNo":"9","name":"first","lat":62.0,"lng":5.0},
            {"localityNo":"9","name":"second","lat":62.1,"lng":5.1}
        ]"#;
        let parsed = parse(json).expect("parses");
        assert_eq!(parsed.sites.len(), 1);
        assert_eq!(parsed.sites[0].name, "first");
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_region_falls_back_to_position_when_missing_or_invalid() {
        let json = r#"[
            {"localityNo":"1","lat":68.0,"lng":13.5},
            {"localityNo":"2","lat":68.0,"lng":13.5,"po":27},
            {"localityNo":"3","lat":68.0,"lng":13.5,"productionAreaId":9}
        ]"#;
        let parsed = parse(json).expect("parses");
        for site in &parsed.sites {
            assert_eq!(site.region_id, 9, "site {} should be in Vestfjorden", site.id);
        }
    }

    #[test]
    fn test_load_increase_from_previous_period() {
        let json = r#"[
            {"localityNo":"1","lat":63.0,"lng":8.0,"adultFemaleLice":0.4,"previousAdultFemaleLice":0.3},
            {"localityNo":"2","lat":63.0,"lng":8.0,"adultFemaleLice":0.38,"previousAdultFemaleLice":0.3},
            {"localityNo":"3","lat":63.0,"lng":8.0,"adultFemaleLice":0.1,"hasLiceIncrease":true}
        ]"#;
        let parsed = parse(json).expect("parses");
        let by_id = |id: &str| parsed.sites.iter().find(|s| s.id == id).expect("present");
        assert!(by_id("1").load_increasing, "0.4 > 0.3 * 1.3");
        assert!(!by_id("2").load_increasing, "0.38 is below 0.3 * 1.3");
        assert!(by_id("3").load_increasing, "explicit flag used without history");
    }

    #[test]
    fn test_missing_load_defaults_to_zero_and_negative_is_clamped() {
        let json = r#"[
            {"localityNo":"1","lat":63.0,"lng":8.0},
            {"localityNo":"2","lat":63.0,"lng":8.0,"adultFemaleLice":-0.2}
        ]"#;
        let parsed = parse(json).expect("parses");
        assert!(parsed.sites.iter().all(|s| s.parasite_load == 0.0));
        assert!(parsed.sites.iter().all(|s| s.water_temp.is_none()));
    }

    #[test]
    fn test_unknown_disease_string_is_ignored() {
        let json = r#"[{"localityNo":"1","lat":63.0,"lng":8.0,"disease":"PD"}]"#;
        let parsed = parse(json).expect("parses");
        assert_eq!(parsed.sites[0].disease_code, None);
    }

    #[test]
    fn test_colliding_spellings_keep_the_record() {
        let json = r#"[
            {"id":"abc","localityNo":42,"lat":60.9,"latitude":61.5,"lng":8.5,"longitude":9.0},
            {"localityNo":43,"lat":62.3,"lng":5.6}
        ]"#;
        let parsed = parse(json).expect("parses");
        let ids: Vec<&str> = parsed.sites.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["42", "43"], "localityNo outranks id");
        assert_eq!(parsed.dropped, 0);
        assert_eq!(
            parsed.sites[0].position,
            Corrector::default().correct(60.9, 8.5),
            "lat/lng outrank latitude/longitude"
        );
    }

    #[test]
    fn test_malformed_optional_fields_read_as_absent() {
        let json = r#"[
            {"localityNo":42,"lat":60.9,"lng":8.5,"adultFemaleLice":0.3,
             "salinity":"n/a","diseaseCode":1,"inQuarantine":"yes","seaTemperature":[9]},
            {"localityNo":43,"lat":62.3,"lng":5.6}
        ]"#;
        let parsed = parse(json).expect("parses");
        assert_eq!(parsed.sites.len(), 2, "bad optional fields must not drop the record");
        assert_eq!(parsed.dropped, 0);

        let site = &parsed.sites[0];
        assert_eq!(site.id, "42");
        assert!((site.parasite_load - 0.3).abs() < 1e-9, "valid fields still read");
        assert_eq!(site.salinity, None);
        assert_eq!(site.disease_code, None);
        assert_eq!(site.in_quarantine, None);
        assert_eq!(site.water_temp, None);
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(parse("<html>"), Err(FeedError::Parse(_))));
    }
}
