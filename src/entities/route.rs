use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// A route returned by the routing service. The polyline stores `x = lng`
/// and `y = lat`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub polyline: LineString<f64>,
    pub expected_travel_time: f64,
    pub distance: f64,
}

impl Route {
    pub fn new(polyline: LineString<f64>, expected_travel_time: f64, distance: f64) -> Self {
        Self {
            polyline,
            expected_travel_time,
            distance,
        }
    }

    /// Builds a route from a sequence of points, measuring its length.
    pub fn from_points(points: &[Coordinates], expected_travel_time: f64) -> Self {
        let distance = points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum();

        let polyline: LineString<f64> = points
            .iter()
            .map(|point| geo_types::Coord::from(*point))
            .collect::<Vec<_>>()
            .into();

        Self::new(polyline, expected_travel_time, distance)
    }

    pub fn points(&self) -> impl Iterator<Item = Coordinates> + '_ {
        self.polyline.coords().map(|coord| Coordinates::from(*coord))
    }

    pub fn start(&self) -> Option<Coordinates> {
        self.points().next()
    }

    pub fn end(&self) -> Option<Coordinates> {
        self.points().last()
    }
}

#[test]
fn route_from_points_measures_length() {
    let a = Coordinates::new(37.7749, -122.4194);
    let b = Coordinates::new(37.7849, -122.4194);
    let c = Coordinates::new(37.7849, -122.4094);

    let route = Route::from_points(&[a, b, c], 300.0);

    let expected = a.distance_to(&b) + b.distance_to(&c);
    assert!((route.distance - expected).abs() < 1e-6);
    assert_eq!(route.start(), Some(a));
    assert_eq!(route.end(), Some(c));
    assert_eq!(route.polyline.0.len(), 3);
}
