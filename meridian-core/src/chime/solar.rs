//! Sunrise and sunset solver
//!
//! Computes the civil rise and set times of the sun's upper limb for a UTC
//! calendar date and observer position, as fractional hours UTC. Accuracy
//! is a minute or two, which is far finer than the whole-hour chime window
//! needs. The math follows Paul Schlyter's low-precision solar position
//! formulae over `libm` (no_std float intrinsics).

use libm::{acos, atan2, cos, floor, sin, sqrt};

const DEG: f64 = core::f64::consts::PI / 180.0;

/// Altitude of the sun's center at civil rise/set, degrees: -35 arc
/// minutes of atmospheric refraction at the horizon.
const RISE_SET_ALTITUDE: f64 = -35.0 / 60.0;

fn sind(x: f64) -> f64 {
    sin(x * DEG)
}

fn cosd(x: f64) -> f64 {
    cos(x * DEG)
}

fn acosd(x: f64) -> f64 {
    acos(x) / DEG
}

fn atan2d(y: f64, x: f64) -> f64 {
    atan2(y, x) / DEG
}

/// Reduce an angle to [0, 360).
fn rev(x: f64) -> f64 {
    x - floor(x / 360.0) * 360.0
}

/// Reduce an angle to [-180, +180).
fn rev180(x: f64) -> f64 {
    x - floor(x / 360.0 + 0.5) * 360.0
}

/// Days elapsed since 2000-01-00 0h UT (Schlyter's epoch).
fn days_since_epoch(year: i32, month: i32, day: i32) -> i32 {
    367 * year - 7 * (year + (month + 9) / 12) / 4 + 275 * month / 9 + day - 730_530
}

/// Greenwich mean sidereal time at 0h UT, in degrees.
fn gmst0(d: f64) -> f64 {
    rev(180.0 + 356.0470 + 282.9404 + (0.985_600_258_5 + 4.709_35e-5) * d)
}

/// Sun's ecliptic longitude (degrees) and distance (AU).
fn sun_position(d: f64) -> (f64, f64) {
    let mean_anomaly = rev(356.0470 + 0.985_600_258_5 * d);
    let perihelion = 282.9404 + 4.709_35e-5 * d;
    let eccentricity = 0.016_709 - 1.151e-9 * d;

    let ea = mean_anomaly
        + eccentricity * (1.0 / DEG) * sind(mean_anomaly) * (1.0 + eccentricity * cosd(mean_anomaly));
    let x = cosd(ea) - eccentricity;
    let y = sqrt(1.0 - eccentricity * eccentricity) * sind(ea);
    let distance = sqrt(x * x + y * y);
    let true_anomaly = atan2d(y, x);
    (rev(true_anomaly + perihelion), distance)
}

/// Sun's right ascension and declination (degrees) plus distance (AU).
fn sun_ra_dec(d: f64) -> (f64, f64, f64) {
    let (longitude, distance) = sun_position(d);
    let x = distance * cosd(longitude);
    let mut y = distance * sind(longitude);

    let obliquity = 23.4393 - 3.563e-7 * d;
    let z = y * sind(obliquity);
    y *= cosd(obliquity);

    let ra = atan2d(y, x);
    let dec = atan2d(z, sqrt(x * x + y * y));
    (ra, dec, distance)
}

/// Civil sunrise and sunset for a UTC calendar date at `lon`/`lat` degrees
/// (east and north positive). Returns fractional hours UTC, or `None` when
/// no rise/set exists for that date and latitude (polar day or night).
pub fn sun_rise_set(year: u16, month: u8, day: u8, lon: f64, lat: f64) -> Option<(f64, f64)> {
    // Local midday in days since the epoch.
    let d = days_since_epoch(year as i32, month as i32, day as i32) as f64 + 0.5 - lon / 360.0;

    let sidereal = rev(gmst0(d) + 180.0 + lon);
    let (ra, dec, distance) = sun_ra_dec(d);

    // Time of solar culmination, hours UTC.
    let noon = 12.0 - rev180(sidereal - ra) / 15.0;

    // Correct to the upper limb using the sun's apparent radius.
    let altitude = RISE_SET_ALTITUDE - 0.2666 / distance;

    let cos_hour_angle = (sind(altitude) - sind(lat) * sind(dec)) / (cosd(lat) * cosd(dec));
    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        // Sun never crosses the rise/set altitude today.
        return None;
    }

    let half_arc_hours = acosd(cos_hour_angle) / 15.0;
    Some((noon - half_arc_hours, noon + half_arc_hours))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_equinox_is_near_six_and_eighteen() {
        let (rise, set) = sun_rise_set(2025, 3, 20, 0.0, 0.0).unwrap();
        assert!((rise - 6.0).abs() < 0.3, "rise {rise}");
        assert!((set - 18.0).abs() < 0.3, "set {set}");
    }

    #[test]
    fn test_greenwich_midsummer() {
        // Published civil times: sunrise 04:43 BST (03:43 UTC),
        // sunset 21:21 BST (20:21 UTC).
        let (rise, set) = sun_rise_set(2025, 6, 21, 0.0, 51.48).unwrap();
        assert!((rise - 3.72).abs() < 0.15, "rise {rise}");
        assert!((set - 20.35).abs() < 0.15, "set {set}");
    }

    #[test]
    fn test_day_length_shrinks_towards_winter() {
        let (rise_jun, set_jun) = sun_rise_set(2025, 6, 21, 0.0, 51.48).unwrap();
        let (rise_dec, set_dec) = sun_rise_set(2025, 12, 21, 0.0, 51.48).unwrap();
        assert!((set_jun - rise_jun) > (set_dec - rise_dec) + 7.0);
    }

    #[test]
    fn test_polar_day_and_night_have_no_solution() {
        // Longyearbyen, 78.22 N.
        assert_eq!(sun_rise_set(2025, 6, 21, 15.55, 78.22), None);
        assert_eq!(sun_rise_set(2025, 12, 21, 15.55, 78.22), None);
    }

    #[test]
    fn test_southern_hemisphere_seasons_invert() {
        // Sydney midwinter: day shorter than 11 hours.
        let (rise, set) = sun_rise_set(2025, 6, 21, 151.2, -33.87).unwrap();
        assert!((set - rise) < 11.0);
    }
}
