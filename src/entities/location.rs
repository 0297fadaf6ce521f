use serde::{Deserialize, Serialize};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_METERS * c
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

impl From<Coordinates> for geo_types::Coord<f64> {
    fn from(coordinates: Coordinates) -> Self {
        geo_types::Coord {
            x: coordinates.lng,
            y: coordinates.lat,
        }
    }
}

impl From<geo_types::Coord<f64>> for Coordinates {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

/// A named place on the map, e.g. a resolved search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub title: String,
    pub coordinates: Coordinates,
}

impl Location {
    pub fn new(coordinates: Coordinates, title: String) -> Self {
        Self { title, coordinates }
    }
}

#[test]
fn distance_across_san_francisco() {
    let city_hall = Coordinates::new(37.7749, -122.4194);
    let ferry_building = Coordinates::new(37.7955, -122.3937);

    let distance = city_hall.distance_to(&ferry_building);

    assert!(distance > 3000.0 && distance < 3400.0);
    assert_eq!(city_hall.distance_to(&city_hall), 0.0);
}

#[test]
fn coordinates_as_query_string() {
    let s: String = Coordinates::new(37.5, -122.25).into();
    assert_eq!(s, "37.5,-122.25");
}
