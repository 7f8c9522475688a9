//! Great-circle distance on a spherical Earth.

use crate::GeoPoint;

/// Mean Earth radius (IUGG) in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two points in kilometers.
pub fn great_circle_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // clamp guards against h drifting past 1.0 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = GeoPoint::new(-23.5, -46.6);
        assert_eq!(great_circle_km(&p, &p), 0.0);
    }

    #[test]
    fn sao_paulo_to_rio_is_about_360_km() {
        let sp = GeoPoint::new(-23.5505, -46.6333);
        let rj = GeoPoint::new(-22.9068, -43.1729);
        let d = great_circle_km(&sp, &rj);
        assert!((d - 361.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(-23.5, -46.6);
        let b = GeoPoint::new(-22.9, -43.2);
        assert!((great_circle_km(&a, &b) - great_circle_km(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        assert!((great_circle_km(&a, &b) - 111.195).abs() < 0.01);
    }
}
