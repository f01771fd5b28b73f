// src/geo.rs

/// Earth radius in km used for all great-circle computations.
const EARTH_RADIUS_KM: f64 = 6380.0;

/// Great-circle distance between two coordinates, in km.
///
/// Uses the spherical law of cosines. Inputs are in degrees. The cosine
/// argument is clamped to 1.0 so that identical (or nearly identical)
/// points never push `acos` out of its domain through floating-point
/// overshoot.
///
/// # Examples
///
/// ```
/// use postcode_db::distance;
///
/// // Unterschleißheim → München, roughly 16 km.
/// let km = distance(48.2804, 11.5768, 48.1374, 11.5755);
/// assert!((km - 15.92).abs() < 0.1);
/// ```
pub fn distance(latitude1: f64, longitude1: f64, latitude2: f64, longitude2: f64) -> f64 {
    let lat1 = latitude1.to_radians();
    let lon1 = longitude1.to_radians();
    let lat2 = latitude2.to_radians();
    let lon2 = longitude2.to_radians();
    let cos_arg =
        (lat2.sin() * lat1.sin() + lat2.cos() * lat1.cos() * (lon2 - lon1).cos()).min(1.0);
    cos_arg.acos() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(distance(48.2804, 11.5768, 48.2804, 11.5768), 0.0);
        assert_eq!(distance(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(distance(-33.87, 151.21, -33.87, 151.21), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = (48.2804, 11.5768);
        let b = (54.10, 10.81);
        assert_eq!(distance(a.0, a.1, b.0, b.1), distance(b.0, b.1, a.0, a.1));
    }

    #[test]
    fn known_distance() {
        // Unterschleißheim → München city centre.
        let km = distance(48.2804, 11.5768, 48.1374, 11.5755);
        assert!((km - 15.9236).abs() < 0.01, "got {km}");
    }

    #[test]
    fn non_negative_for_antipodal_points() {
        let km = distance(0.0, 0.0, 0.0, 180.0);
        assert!(km > 0.0);
        assert!((km - std::f64::consts::PI * 6380.0).abs() < 1.0);
    }
}
