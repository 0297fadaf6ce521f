use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Location, RideTier, Route};

/// Which surface the map screen shows. A destination lives inside the
/// variants that need one, so it cannot outlive them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum MapState {
    Idle,
    Searching,
    DestinationChosen {
        destination: Location,
        route_request: Option<Uuid>,
    },
    RouteDrawn {
        destination: Location,
        route: Route,
        received_at: DateTime<Utc>,
        selected_tier: RideTier,
    },
}

impl MapState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::DestinationChosen { .. } => "destination_chosen",
            Self::RouteDrawn { .. } => "route_drawn",
        }
    }

    pub fn destination(&self) -> Option<&Location> {
        match self {
            Self::DestinationChosen { destination, .. } | Self::RouteDrawn { destination, .. } => {
                Some(destination)
            }
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::RouteDrawn { route, .. } => Some(route),
            _ => None,
        }
    }

    pub fn route_request(&self) -> Option<Uuid> {
        match self {
            Self::DestinationChosen { route_request, .. } => *route_request,
            _ => None,
        }
    }

    /// Whether a marker or route may currently be on the map.
    pub fn has_overlays(&self) -> bool {
        self.destination().is_some()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl Default for MapState {
    fn default() -> Self {
        Self::Idle
    }
}
