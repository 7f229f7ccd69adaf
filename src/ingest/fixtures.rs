/// Test fixtures: representative feed payloads.
///
/// Structurally complete but truncated to the minimum needed to exercise
/// the parsers. They cover the shapes seen across feed revisions:
///
///   site feed
///     - bare array of locality records, or `{ "items": [...] }` /
///       `{ "data": [...] }` envelopes with paging fields beside them
///     - `localityNo` as a string or an integer
///     - coordinates as `lat`/`lng` or `latitude`/`longitude`
///
///   vessel feed
///     - `mmsi` as string or integer, free-text `shipType`
///     - `trueHeading` of 511 meaning "not available"

/// Three complete records, one per feed revision style.
/// Hardanger Nord (12345) is diseased and quarantined.
pub(crate) fn fixture_sites_array_json() -> &'static str {
    r#"[
      {
        "localityNo": 12345,
        "name": "Hardanger Nord",
        "lat": 60.31,
        "lng": 6.22,
        "po": 3,
        "adultFemaleLice": 0.42,
        "seaTemperature": 9.4,
        "salinity": 31.2,
        "diseaseCode": "A",
        "inQuarantine": true
      },
      {
        "localityNo": "31177",
        "localityName": "Frøya Vest",
        "latitude": 63.72,
        "longitude": 8.61,
        "productionAreaId": 6,
        "avgAdultFemaleLice": 0.08,
        "temperature": 7.1,
        "currentDirection": 45.0,
        "currentSpeed": 0.21
      },
      {
        "localityNo": "10840",
        "name": "Senja Ytre",
        "lat": 69.35,
        "lon": 17.42,
        "adultFemaleLice": 0.71,
        "seaTemperature": 6.2,
        "chlorophyll": 12.5,
        "forcedSlaughter": true
      }
    ]"#
}

/// Paginated `items` envelope, including the on-land record from the
/// end-to-end scenario (60.9, 8.5).
pub(crate) fn fixture_sites_paginated_json() -> &'static str {
    r#"{
      "page": 1,
      "pageSize": 2,
      "totalItems": 2,
      "items": [
        { "lat": 60.9, "lng": 8.5, "adultFemaleLice": 0.6, "localityNo": "42" },
        { "lat": 62.3, "lng": 5.6, "adultFemaleLice": 0.1, "localityNo": "43", "name": "Sunnmøre Sør" }
      ]
    }"#
}

/// One valid record among four that must be dropped: missing latitude,
/// missing locality number, latitude as a string, blank locality number.
pub(crate) fn fixture_sites_with_bad_records_json() -> &'static str {
    r#"{
      "data": [
        { "localityNo": "100", "lng": 5.1 },
        { "lat": 61.0, "lng": 5.1, "name": "Anonymous" },
        { "localityNo": "101", "lat": "61.0", "lng": 5.1 },
        { "localityNo": "   ", "lat": 61.0, "lng": 5.1 },
        { "localityNo": "777", "lat": 61.2, "lng": 5.0, "adultFemaleLice": 0.3 }
      ]
    }"#
}

/// Four vessel reports; the last has no position.
pub(crate) fn fixture_vessels_json() -> &'static str {
    r#"[
      {
        "mmsi": 257012340,
        "name": "Ronja Nordic",
        "shipType": "Well boat",
        "latitude": 63.41,
        "longitude": 8.12,
        "trueHeading": 184,
        "speedOverGround": 9.8,
        "passedRiskZone": true
      },
      {
        "mmsi": "258991000",
        "name": "Frøy Service",
        "shipType": "Offshore supply",
        "latitude": 62.48,
        "longitude": 6.05,
        "trueHeading": 511,
        "courseOverGround": 271.3,
        "speedOverGround": 4.1
      },
      {
        "mmsi": "259004560",
        "name": "Kabelbas",
        "shipType": "Kabelskip",
        "lat": 69.1,
        "lon": 17.8,
        "heading": 12,
        "speed": 0.0,
        "passedRiskZone": false
      },
      {
        "mmsi": "259000001",
        "name": "No Fix",
        "shipType": "Fishing"
      }
    ]"#
}

/// Vessel feed with no usable records.
pub(crate) fn fixture_vessels_empty_json() -> &'static str {
    r#"{ "data": [] }"#
}
