/// Offline coordinate correction and flat-earth distance helpers.
///
/// Upstream geocoding places a share of sites on land. `Corrector` nudges a
/// raw coordinate 400–1200 m seaward using a per-latitude-band bearing that
/// follows the general orientation of the coast, south-west in the south
/// rotating clockwise to north-east in Finnmark. It is a heuristic, not a
/// land/water lookup, and can still misplace a coordinate.
///
/// Distances elsewhere in the crate are Euclidean in raw degrees. This is
/// acceptable at the tens-of-kilometres scale used by the scoring rules but
/// overstates east-west separation at high latitude, where a degree of
/// longitude shrinks with cos(lat). The approximation is kept deliberately
/// so scores stay comparable with the historical rule set.

use crate::model::Position;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Metres per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

pub const MIN_OFFSET_M: f64 = 400.0;
pub const MAX_OFFSET_M: f64 = 1200.0;

/// Largest deterministic perturbation applied to a band's base bearing.
pub const MAX_BEARING_JITTER_DEG: f64 = 30.0;

/// Inputs are rounded to this many steps per degree before hashing
/// (4 decimals, roughly 11 m).
const COORD_HASH_SCALE: f64 = 10_000.0;

/// Floor for cos(lat) so the longitude scaling stays finite near the poles.
const MIN_COS_LAT: f64 = 0.01;

// ---------------------------------------------------------------------------
// Latitude bands
// ---------------------------------------------------------------------------

/// Seaward heuristic for one slice of coastline.
#[derive(Debug)]
pub struct LatitudeBand {
    /// Southern edge of the band, inclusive.
    pub min_lat: f64,
    /// Compass bearing of the offset before perturbation.
    pub base_bearing_deg: f64,
    /// Offset length before perturbation, metres.
    pub base_offset_m: f64,
}

/// Eight bands ordered south to north. The southern coast is more indented
/// and needs longer offsets to clear land.
pub static LATITUDE_BANDS: [LatitudeBand; 8] = [
    LatitudeBand { min_lat: f64::NEG_INFINITY, base_bearing_deg: 225.0, base_offset_m: 1100.0 },
    LatitudeBand { min_lat: 59.0, base_bearing_deg: 250.0, base_offset_m: 1000.0 },
    LatitudeBand { min_lat: 60.0, base_bearing_deg: 275.0, base_offset_m: 900.0 },
    LatitudeBand { min_lat: 61.0, base_bearing_deg: 300.0, base_offset_m: 820.0 },
    LatitudeBand { min_lat: 62.5, base_bearing_deg: 325.0, base_offset_m: 740.0 },
    LatitudeBand { min_lat: 64.0, base_bearing_deg: 350.0, base_offset_m: 660.0 },
    LatitudeBand { min_lat: 66.5, base_bearing_deg: 15.0, base_offset_m: 580.0 },
    LatitudeBand { min_lat: 69.0, base_bearing_deg: 45.0, base_offset_m: 500.0 },
];

/// Returns the band containing `lat`. Non-finite input falls into the
/// southernmost band.
pub fn band_for(lat: f64) -> &'static LatitudeBand {
    LATITUDE_BANDS
        .iter()
        .rev()
        .find(|band| band.min_lat <= lat)
        .unwrap_or(&LATITUDE_BANDS[0])
}

// ---------------------------------------------------------------------------
// Corrector
// ---------------------------------------------------------------------------

/// A displacement in metric terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub bearing_deg: f64,
    pub distance_m: f64,
}

/// Deterministic seaward corrector.
///
/// The pseudo-variation is a pure function of the rounded input and the
/// seed, so co-located inputs spread out without any hidden randomness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Corrector {
    seed: u64,
}

impl Corrector {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Computes the offset that `correct` will apply to this input.
    pub fn offset_for(&self, lat: f64, lng: f64) -> Offset {
        let band = band_for(lat);
        let (u_bearing, u_distance) = self.variation(lat, lng);

        let jitter = (u_bearing * 2.0 - 1.0) * MAX_BEARING_JITTER_DEG;
        let bearing_deg = (band.base_bearing_deg + jitter).rem_euclid(360.0);
        let distance_m =
            (band.base_offset_m * (0.9 + 0.2 * u_distance)).clamp(MIN_OFFSET_M, MAX_OFFSET_M);

        Offset { bearing_deg, distance_m }
    }

    /// Maps a raw coordinate to its water-biased position.
    pub fn correct(&self, lat: f64, lng: f64) -> Position {
        let offset = self.offset_for(lat, lng);
        let bearing = offset.bearing_deg.to_radians();
        let cos_lat = lat.to_radians().cos().abs().max(MIN_COS_LAT);

        let d_lat = offset.distance_m * bearing.cos() / METERS_PER_DEGREE;
        let d_lng = offset.distance_m * bearing.sin() / (METERS_PER_DEGREE * cos_lat);

        Position::new(lat + d_lat, lng + d_lng)
    }

    /// Two independent values in [0, 1) derived from the rounded input.
    fn variation(&self, lat: f64, lng: f64) -> (f64, f64) {
        let lat_key = (lat * COORD_HASH_SCALE).round() as i64 as u64;
        let lng_key = (lng * COORD_HASH_SCALE).round() as i64 as u64;

        let first = splitmix64(self.seed ^ splitmix64(lat_key ^ splitmix64(lng_key)));
        let second = splitmix64(first);
        (unit_interval(first), unit_interval(second))
    }
}

/// Corrects with the default seed.
pub fn correct(lat: f64, lng: f64) -> Position {
    Corrector::default().correct(lat, lng)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn unit_interval(h: u64) -> f64 {
    (h >> 11) as f64 / (1u64 << 53) as f64
}

// ---------------------------------------------------------------------------
// Distance and bearing
// ---------------------------------------------------------------------------

/// Euclidean distance in unprojected degrees.
pub fn degree_distance(a: &Position, b: &Position) -> f64 {
    ((a.lat - b.lat).powi(2) + (a.lng - b.lng).powi(2)).sqrt()
}

/// Bearing from `from` to `to` in the same flat degree space as
/// `degree_distance`, 0..360 clockwise from north.
pub fn bearing_deg(from: &Position, to: &Position) -> f64 {
    (to.lng - from.lng)
        .atan2(to.lat - from.lat)
        .to_degrees()
        .rem_euclid(360.0)
}

/// Smallest absolute difference between two bearings, 0..=180.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Recovers the metric offset between a raw and a corrected coordinate.
pub fn offset_between(raw: &Position, corrected: &Position) -> Offset {
    let cos_lat = raw.lat.to_radians().cos().abs().max(MIN_COS_LAT);
    let north_m = (corrected.lat - raw.lat) * METERS_PER_DEGREE;
    let east_m = (corrected.lng - raw.lng) * METERS_PER_DEGREE * cos_lat;

    Offset {
        bearing_deg: east_m.atan2(north_m).to_degrees().rem_euclid(360.0),
        distance_m: (north_m.powi(2) + east_m.powi(2)).sqrt(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_are_ordered_south_to_north() {
        for pair in LATITUDE_BANDS.windows(2) {
            assert!(pair[0].min_lat < pair[1].min_lat);
            assert!(
                pair[0].base_offset_m > pair[1].base_offset_m,
                "offsets should shrink northward"
            );
        }
    }

    #[test]
    fn test_band_lookup_edges() {
        assert_eq!(band_for(58.0).base_bearing_deg, 225.0);
        assert_eq!(band_for(60.0).base_bearing_deg, 275.0, "edge is inclusive");
        assert_eq!(band_for(60.9).base_bearing_deg, 275.0);
        assert_eq!(band_for(71.0).base_bearing_deg, 45.0);
        assert_eq!(band_for(f64::NAN).base_bearing_deg, 225.0);
    }

    #[test]
    fn test_correct_is_deterministic() {
        let a = correct(60.9, 8.5);
        let b = correct(60.9, 8.5);
        assert_eq!(a, b, "same input must give the same output");
    }

    #[test]
    fn test_correct_moves_the_coordinate() {
        let raw = Position::new(60.9, 8.5);
        let corrected = correct(raw.lat, raw.lng);
        assert_ne!(corrected, raw);
    }

    #[test]
    fn test_offset_stays_within_band_limits() {
        for i in 0..200 {
            let lat = 57.5 + f64::from(i) * 0.07;
            let lng = 4.0 + f64::from(i % 17) * 0.9;
            let raw = Position::new(lat, lng);
            let corrected = correct(lat, lng);
            let offset = offset_between(&raw, &corrected);
            let band = band_for(lat);

            assert!(
                offset.distance_m >= MIN_OFFSET_M - 1.0 && offset.distance_m <= MAX_OFFSET_M + 1.0,
                "offset {} m out of range at ({}, {})",
                offset.distance_m,
                lat,
                lng
            );
            assert!(
                angular_difference(offset.bearing_deg, band.base_bearing_deg)
                    <= MAX_BEARING_JITTER_DEG + 1e-6,
                "bearing {} too far from band base {} at ({}, {})",
                offset.bearing_deg,
                band.base_bearing_deg,
                lat,
                lng
            );
        }
    }

    #[test]
    fn test_colocated_inputs_do_not_share_one_vector() {
        let offsets: Vec<Offset> = (0..10)
            .map(|i| Corrector::default().offset_for(63.1, 7.8 + f64::from(i) * 0.001))
            .collect();
        let first = offsets[0].bearing_deg;
        assert!(
            offsets.iter().any(|o| (o.bearing_deg - first).abs() > 1e-9),
            "nearby inputs should receive different bearings"
        );
    }

    #[test]
    fn test_seed_changes_variation() {
        let a = Corrector::with_seed(1).offset_for(63.1, 7.8);
        let b = Corrector::with_seed(2).offset_for(63.1, 7.8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_longitude_delta_scales_with_latitude() {
        let raw = Position::new(70.5, 29.0);
        let corrected = correct(raw.lat, raw.lng);
        let offset = offset_between(&raw, &corrected);
        let naive_lng_m = (corrected.lng - raw.lng).abs() * METERS_PER_DEGREE;
        assert!(
            offset.distance_m <= MAX_OFFSET_M + 1.0,
            "metric offset must stay bounded at high latitude"
        );
        assert!(
            naive_lng_m > (offset.distance_m * offset.bearing_deg.to_radians().sin()).abs(),
            "raw degree delta should be widened by 1/cos(lat)"
        );
    }

    #[test]
    fn test_degree_distance_and_bearing() {
        let a = Position::new(60.0, 5.0);
        let b = Position::new(60.3, 5.4);
        assert!((degree_distance(&a, &b) - 0.5).abs() < 1e-9);

        let north = Position::new(61.0, 5.0);
        assert!((bearing_deg(&a, &north) - 0.0).abs() < 1e-9);
        let east = Position::new(60.0, 6.0);
        assert!((bearing_deg(&a, &east) - 90.0).abs() < 1e-9);
        let west = Position::new(60.0, 4.0);
        assert!((bearing_deg(&a, &west) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert_eq!(angular_difference(350.0, 10.0), 20.0);
        assert_eq!(angular_difference(10.0, 350.0), 20.0);
        assert_eq!(angular_difference(0.0, 180.0), 180.0);
        assert_eq!(angular_difference(90.0, 90.0), 0.0);
    }
}
