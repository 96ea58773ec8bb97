//! Great-circle distance in nautical miles

/// Radius of Earth in nautical miles
const EARTH_RADIUS_NM: f64 = 3440.065;

/// DJB VOR, the facility reference point for proximity filtering
pub const DJB_VOR: (f64, f64) = (41.2129, -82.9431);

/// Haversine distance between two lat/lon points, in nautical miles.
///
/// Used to scope the aircraft cache and the display radius filter around
/// the facility reference point.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_NM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert!(distance_nm(41.2129, -82.9431, 41.2129, -82.9431) < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_sixty_nm() {
        let d = distance_nm(40.0, -83.0, 41.0, -83.0);
        assert!((d - 60.0).abs() < 0.2, "got {}", d);
    }

    #[test]
    fn djb_to_dtw_is_under_100_nm() {
        // DJB VOR to Detroit Metro, roughly 80 nm
        let d = distance_nm(41.2129, -82.9431, 42.2124, -83.3534);
        assert!(d > 60.0 && d < 100.0, "got {}", d);
    }
}
