//! Open-hours and distance predicate

use chrono::NaiveTime;

use crate::domain::restaurant::Restaurant;
use crate::domain::DomainError;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two coordinate pairs
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Rejects a caller position outside [-90, 90] x [-180, 180].
///
/// NaN fails both range checks, so it is rejected too.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), DomainError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::validation(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::validation(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}

/// Whether the restaurant is open at `time`.
///
/// Both ends are exclusive: at exactly the opening or closing time the
/// restaurant is closed. Windows crossing midnight (`closes_at <= opens_at`)
/// are never open.
pub fn is_open_at(restaurant: &Restaurant, time: NaiveTime) -> bool {
    restaurant.opens_at() < time && time < restaurant.closes_at()
}

/// Whether the restaurant is open at `time` and strictly closer than
/// `radius_km` to `(latitude, longitude)`
pub fn is_open_and_close(
    restaurant: &Restaurant,
    time: NaiveTime,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> bool {
    is_open_at(restaurant, time)
        && distance_km(
            latitude,
            longitude,
            restaurant.latitude(),
            restaurant.longitude(),
        ) < radius_km
}

/// One caller's position, time and serving radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub time: NaiveTime,
    pub radius_km: f64,
}

impl ProximityQuery {
    pub fn new(latitude: f64, longitude: f64, time: NaiveTime, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            time,
            radius_km,
        }
    }

    pub fn admits(&self, restaurant: &Restaurant) -> bool {
        is_open_and_close(
            restaurant,
            self.time,
            self.latitude,
            self.longitude,
            self.radius_km,
        )
    }

    /// Keeps admitted restaurants, preserving order
    pub fn retain(&self, restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
        restaurants.into_iter().filter(|r| self.admits(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::restaurant::{time_of_day, RestaurantId};

    fn time(value: &str) -> NaiveTime {
        time_of_day::parse(value).unwrap()
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.5, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::NAN).is_err());
        assert!(validate_coordinates(f64::INFINITY, 0.0).is_err());
    }

    fn restaurant(lat: f64, lon: f64, opens: &str, closes: &str) -> Restaurant {
        Restaurant::new(
            RestaurantId::new("1").unwrap(),
            "Test",
            lat,
            lon,
            time(opens),
            time(closes),
        )
    }

    #[test]
    fn test_distance_same_point() {
        assert_eq!(distance_km(12.97, 77.59, 12.97, 77.59), 0.0);
    }

    #[test]
    fn test_distance_known_value() {
        // One degree of latitude along a meridian
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = distance_km(28.49, 77.53, 28.52, 77.60);
        let b = distance_km(28.52, 77.60, 28.49, 77.53);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_open_boundaries_are_closed() {
        let r = restaurant(0.0, 0.0, "10:00", "22:00");

        assert!(!is_open_at(&r, time("10:00:00")));
        assert!(is_open_at(&r, time("10:00:01")));
        assert!(is_open_at(&r, time("21:59:59")));
        assert!(!is_open_at(&r, time("22:00:00")));
        assert!(!is_open_at(&r, time("09:00")));
    }

    #[test]
    fn test_overnight_window_is_never_open() {
        let r = restaurant(0.0, 0.0, "22:00", "02:00");

        assert!(!is_open_at(&r, time("23:00")));
        assert!(!is_open_at(&r, time("01:00")));
        assert!(!is_open_at(&r, time("12:00")));
    }

    #[test]
    fn test_radius_is_strict() {
        let r = restaurant(1.0, 0.0, "00:00", "23:59:59");
        let exact = distance_km(0.0, 0.0, 1.0, 0.0);

        assert!(!is_open_and_close(&r, time("12:00"), 0.0, 0.0, exact));
        assert!(is_open_and_close(&r, time("12:00"), 0.0, 0.0, exact + 1e-6));
    }

    #[test]
    fn test_closed_restaurant_is_rejected_even_when_near() {
        let r = restaurant(0.0, 0.0, "10:00", "11:00");
        assert!(!is_open_and_close(&r, time("12:00"), 0.0, 0.0, 5.0));
    }

    #[test]
    fn test_proximity_query_retain_keeps_order() {
        let near = |id: &str, lat: f64| {
            Restaurant::new(
                RestaurantId::new(id).unwrap(),
                id,
                lat,
                0.0,
                time("06:00"),
                time("23:00"),
            )
        };

        let query = ProximityQuery::new(0.0, 0.0, time("12:00"), 5.0);
        let kept = query.retain(vec![near("a", 0.01), near("far", 1.0), near("b", 0.02)]);

        let ids: Vec<_> = kept.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
