/// Production region registry for the Norwegian coast.
///
/// Defines the 13 production regions that partition monitored sites. This
/// is the single source of truth for region ids and display names; other
/// modules should resolve names through `find_region` rather than
/// formatting them ad hoc.
///
/// The latitude bounds are approximate and only used to place feed records
/// that arrive without a usable region id.

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for a single production region.
pub struct Region {
    /// 1..=13, south to north.
    pub id: u8,
    pub name: &'static str,
    /// Approximate southern boundary along the coast, decimal degrees.
    pub min_lat: f64,
}

pub const MIN_REGION_ID: u8 = 1;
pub const MAX_REGION_ID: u8 = 13;

/// Longitude east of which northern coordinates fall in Vest-Finnmark.
const WEST_FINNMARK_MIN_LNG: f64 = 21.0;
/// Longitude east of which northern coordinates fall in Øst-Finnmark.
const EAST_FINNMARK_MIN_LNG: f64 = 26.0;
const FINNMARK_MIN_LAT: f64 = 69.8;

pub static REGION_REGISTRY: &[Region] = &[
    Region { id: 1, name: "Svenskegrensen til Jæren", min_lat: f64::NEG_INFINITY },
    Region { id: 2, name: "Ryfylke", min_lat: 58.9 },
    Region { id: 3, name: "Karmøy til Sotra", min_lat: 59.5 },
    Region { id: 4, name: "Nordhordland til Stadt", min_lat: 60.5 },
    Region { id: 5, name: "Stadt til Hustadvika", min_lat: 62.2 },
    Region { id: 6, name: "Nordmøre og Sør-Trøndelag", min_lat: 63.0 },
    Region { id: 7, name: "Nord-Trøndelag med Bindal", min_lat: 64.3 },
    Region { id: 8, name: "Helgeland til Bodø", min_lat: 65.3 },
    Region { id: 9, name: "Vestfjorden og Vesterålen", min_lat: 67.5 },
    Region { id: 10, name: "Andøya til Senja", min_lat: 68.9 },
    Region { id: 11, name: "Kvaløya til Loppa", min_lat: 69.4 },
    Region { id: 12, name: "Vest-Finnmark", min_lat: FINNMARK_MIN_LAT },
    Region { id: 13, name: "Øst-Finnmark", min_lat: FINNMARK_MIN_LAT },
];

/// Returns the registry entry for `id`, or `None` outside 1..=13.
pub fn find_region(id: u8) -> Option<&'static Region> {
    REGION_REGISTRY.iter().find(|r| r.id == id)
}

pub fn is_valid_region_id(id: i64) -> bool {
    (i64::from(MIN_REGION_ID)..=i64::from(MAX_REGION_ID)).contains(&id)
}

/// Places a coordinate in a production region using the registry's
/// approximate boundaries.
///
/// Regions 1..=11 are stacked by latitude along the coast. North of
/// `FINNMARK_MIN_LAT` the two Finnmark regions are split by longitude.
pub fn region_for_position(lat: f64, lng: f64) -> u8 {
    if lat >= FINNMARK_MIN_LAT && lng >= EAST_FINNMARK_MIN_LNG {
        return 13;
    }
    if lat >= FINNMARK_MIN_LAT && lng >= WEST_FINNMARK_MIN_LNG {
        return 12;
    }

    REGION_REGISTRY
        .iter()
        .filter(|r| r.id <= 11 && r.min_lat <= lat)
        .map(|r| r.id)
        .max()
        .unwrap_or(MIN_REGION_ID)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
