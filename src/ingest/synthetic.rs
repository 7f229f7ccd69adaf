/// Procedural fallback dataset.
///
/// Used only when the live feed fails and no cache entry exists, so the
/// service stays usable fully disconnected. Names and regions come from
/// fixed pools along the coast; measurements are drawn from plausible
/// ranges. With a seed the output is reproducible, without one it is drawn
/// from entropy and varies between calls.
///
/// Site ids are index-based (`synthetic-<n>`) so they stay stable across
/// cycles even when measurements vary.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo::Corrector;
use crate::model::{DiseaseCode, Position, Site, Vessel, VesselType};

/// Upper bound on generated records regardless of configuration.
pub const MAX_SYNTHETIC_RECORDS: usize = 500;

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

const OPERATOR_NAMES: &[&str] = &[
    "Nordlaks", "SalMar", "Mowi", "Lerøy", "Grieg", "Nova Sea", "Cermaq",
    "Alsaker", "Bremnes", "SinkabergHansen", "Eidsfjord", "Kvarøy", "Lovundlaks",
];

struct Locality {
    name: &'static str,
    lat: f64,
    lng: f64,
    region_id: u8,
}

const LOCALITIES: &[Locality] = &[
    Locality { name: "Ryfylke", lat: 59.1, lng: 5.9, region_id: 2 },
    Locality { name: "Hardanger", lat: 60.3, lng: 6.2, region_id: 3 },
    Locality { name: "Sogn", lat: 61.1, lng: 5.5, region_id: 4 },
    Locality { name: "Sunnmøre", lat: 62.2, lng: 6.0, region_id: 5 },
    Locality { name: "Nordmøre", lat: 63.1, lng: 7.8, region_id: 6 },
    Locality { name: "Trøndelag S", lat: 63.8, lng: 9.0, region_id: 6 },
    Locality { name: "Trøndelag N", lat: 64.5, lng: 10.5, region_id: 7 },
    Locality { name: "Helgeland", lat: 66.0, lng: 12.5, region_id: 8 },
    Locality { name: "Lofoten", lat: 68.0, lng: 13.5, region_id: 9 },
    Locality { name: "Vesterålen", lat: 68.8, lng: 15.0, region_id: 9 },
    Locality { name: "Senja", lat: 69.3, lng: 17.5, region_id: 10 },
    Locality { name: "Vest-Finnmark", lat: 70.2, lng: 22.5, region_id: 12 },
    Locality { name: "Øst-Finnmark", lat: 70.5, lng: 29.0, region_id: 13 },
];

const VESSEL_NAMES: &[&str] = &[
    "Ronja Nordic", "Gripfisk", "Frøy Viking", "Havlys", "Seihav", "Norsk Fjord",
    "Kabelbas", "Aqua Senja", "Brønnøy", "Nordfjordbas",
];

const VESSEL_TYPES: &[VesselType] = &[
    VesselType::WellBoat,
    VesselType::Service,
    VesselType::Fishing,
    VesselType::Cable,
    VesselType::Unknown,
];

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    seed: Option<u64>,
    site_count: usize,
    vessel_count: usize,
    corrector: Corrector,
}

impl SyntheticGenerator {
    pub fn new(seed: Option<u64>, site_count: usize, vessel_count: usize) -> Self {
        Self {
            seed,
            site_count: site_count.clamp(1, MAX_SYNTHETIC_RECORDS),
            vessel_count: vessel_count.clamp(1, MAX_SYNTHETIC_RECORDS),
            corrector: Corrector::default(),
        }
    }

    pub fn with_corrector(mut self, corrector: Corrector) -> Self {
        self.corrector = corrector;
        self
    }

    fn rng(&self, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ stream),
            None => StdRng::from_entropy(),
        }
    }

    /// Generates `site_count` sites with corrected positions.
    pub fn sites(&self) -> Vec<Site> {
        let mut rng = self.rng(0x51735);

        (0..self.site_count)
            .map(|i| {
                let base = &LOCALITIES[i % LOCALITIES.len()];
                let raw_lat = base.lat + rng.gen_range(-0.4..0.4);
                let raw_lng = base.lng + rng.gen_range(-0.75..0.75);

                let disease_code = rng.gen_bool(0.06).then(|| match rng.gen_range(0..3) {
                    0 => DiseaseCode::A,
                    1 => DiseaseCode::B,
                    _ => DiseaseCode::C,
                });
                let in_quarantine = disease_code.is_some() && rng.gen_bool(0.5);

                Site {
                    id: format!("synthetic-{}", i),
                    name: format!(
                        "{} {} {}",
                        OPERATOR_NAMES[i % OPERATOR_NAMES.len()],
                        base.name,
                        i + 1
                    ),
                    region_id: base.region_id,
                    position: self.corrector.correct(raw_lat, raw_lng),
                    parasite_load: rng.gen_range(0.0..0.8),
                    water_temp: Some(rng.gen_range(4.0..14.0)),
                    salinity: Some(rng.gen_range(28.0..35.0)),
                    load_increasing: rng.gen_bool(0.3),
                    nearby_high_load_neighbor: rng.gen_bool(0.2),
                    current_direction: Some(rng.gen_range(0.0..360.0)),
                    current_speed: Some(rng.gen_range(0.0..0.5)),
                    chlorophyll: Some(rng.gen_range(0.5..14.0)),
                    forced_cull: Some(rng.gen_bool(0.02)),
                    disease_code,
                    in_quarantine: Some(in_quarantine),
                }
            })
            .collect()
    }

    /// Generates `vessel_count` vessels spread over the same localities.
    pub fn vessels(&self) -> Vec<Vessel> {
        let mut rng = self.rng(0x7E55E1);

        (0..self.vessel_count)
            .map(|i| {
                let base = &LOCALITIES[(i * 5) % LOCALITIES.len()];
                Vessel {
                    id: format!("synthetic-vessel-{}", i),
                    name: VESSEL_NAMES[i % VESSEL_NAMES.len()].to_string(),
                    vessel_type: VESSEL_TYPES[i % VESSEL_TYPES.len()],
                    position: Position::new(
                        base.lat + rng.gen_range(-0.3..0.3),
                        base.lng + rng.gen_range(-0.6..0.6),
                    ),
                    heading: rng.gen_range(0..360),
                    speed_knots: rng.gen_range(0.0..14.0),
                    passed_risk_zone: rng.gen_bool(0.2),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
