use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

pub const DEFAULT_SPAN: f64 = 0.05;
pub const MIN_SPAN: f64 = 0.005;

/// Fraction of the viewport to keep clear on each side when fitting a route.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgePadding {
    /// Leaves the lower half of the map for the ride request sheet.
    pub fn ride_request_sheet() -> Self {
        Self {
            top: 0.1,
            left: 0.1,
            bottom: 0.55,
            right: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Coordinates,
    pub lat_span: f64,
    pub lng_span: f64,
}

impl MapRegion {
    pub fn around(center: Coordinates) -> Self {
        Self {
            center,
            lat_span: DEFAULT_SPAN,
            lng_span: DEFAULT_SPAN,
        }
    }

    /// Smallest region showing the whole polyline with `padding` kept free.
    /// Returns `None` for an empty polyline.
    pub fn fitting(polyline: &LineString<f64>, padding: EdgePadding) -> Option<Self> {
        let mut coords = polyline.coords();
        let first = coords.next()?;

        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for c in coords {
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }

        let lat_span = ((max_y - min_y) / (1.0 - padding.top - padding.bottom)).max(MIN_SPAN);
        let lng_span = ((max_x - min_x) / (1.0 - padding.left - padding.right)).max(MIN_SPAN);

        let mid_y = (min_y + max_y) / 2.0;
        let mid_x = (min_x + max_x) / 2.0;

        // shift the center so the route sits inside the unpadded part
        let lat = mid_y - (padding.bottom - padding.top) * lat_span / 2.0;
        let lng = mid_x - (padding.left - padding.right) * lng_span / 2.0;

        Some(Self {
            center: Coordinates::new(lat, lng),
            lat_span,
            lng_span,
        })
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (point.lat - self.center.lat).abs() <= self.lat_span / 2.0
            && (point.lng - self.center.lng).abs() <= self.lng_span / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Route;

    #[test]
    fn region_around_user() {
        let region = MapRegion::around(Coordinates::new(37.7749, -122.4194));
        assert_eq!(region.lat_span, 0.05);
        assert_eq!(region.lng_span, 0.05);
    }

    #[test]
    fn fitted_region_keeps_route_above_sheet() {
        let origin = Coordinates::new(37.7749, -122.4194);
        let destination = Coordinates::new(37.7955, -122.3937);
        let route = Route::from_points(&[origin, destination], 600.0);
        let padding = EdgePadding::ride_request_sheet();

        let region = MapRegion::fitting(&route.polyline, padding).unwrap();

        assert!(region.contains(&origin));
        assert!(region.contains(&destination));

        // the lowest point of the route sits at the top edge of the sheet
        let bottom_edge = region.center.lat - region.lat_span / 2.0;
        let sheet_top = bottom_edge + padding.bottom * region.lat_span;
        assert!((sheet_top - origin.lat).abs() < 1e-9);
    }

    #[test]
    fn degenerate_route_has_minimum_span() {
        let point = Coordinates::new(37.7749, -122.4194);
        let route = Route::from_points(&[point, point], 0.0);

        let region = MapRegion::fitting(&route.polyline, EdgePadding::ride_request_sheet()).unwrap();

        assert_eq!(region.lat_span, MIN_SPAN);
        assert_eq!(region.lng_span, MIN_SPAN);
        assert!(region.contains(&point));
    }

    #[test]
    fn empty_polyline_has_no_region() {
        let empty: LineString<f64> = LineString::new(vec![]);
        assert!(MapRegion::fitting(&empty, EdgePadding::ride_request_sheet()).is_none());
    }
}
