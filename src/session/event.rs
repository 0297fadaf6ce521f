use chrono::{DateTime, Utc};
use geo_types::LineString;
use uuid::Uuid;

use crate::entities::{Coordinates, Location, MapRegion, RideTier, Route, SearchCompletion};
use crate::error::Error;
use crate::session::Notice;

/// Inputs to the session: user intents and collaborator completions.
#[derive(Clone, Debug)]
pub enum Event {
    LocationUpdated(Coordinates),
    LocationDenied,
    SearchActivated,
    QueryChanged(String),
    CompletionsUpdated {
        query: String,
        result: Result<Vec<SearchCompletion>, Error>,
    },
    CompletionSelected(SearchCompletion),
    DestinationResolved {
        request: Uuid,
        result: Result<Location, Error>,
    },
    DestinationSelected(Location),
    RouteResolved {
        request: Uuid,
        result: Result<Route, Error>,
        received_at: DateTime<Utc>,
    },
    RetryRoute,
    TierSelected(RideTier),
    NoticeDismissed,
    Back,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocationUpdated(_) => "location_updated",
            Self::LocationDenied => "location_denied",
            Self::SearchActivated => "search_activated",
            Self::QueryChanged(_) => "query_changed",
            Self::CompletionsUpdated { .. } => "completions_updated",
            Self::CompletionSelected(_) => "completion_selected",
            Self::DestinationResolved { .. } => "destination_resolved",
            Self::DestinationSelected(_) => "destination_selected",
            Self::RouteResolved { .. } => "route_resolved",
            Self::RetryRoute => "retry_route",
            Self::TierSelected(_) => "tier_selected",
            Self::NoticeDismissed => "notice_dismissed",
            Self::Back => "back",
        }
    }
}

/// Outputs of the session. Map effects go to the map surface, requests go
/// to the collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    ClearOverlays,
    Recenter(MapRegion),
    PlaceMarker(Coordinates),
    DrawRoute(LineString<f64>),
    FitRegion(MapRegion),
    ShowNotice(Notice),
    RequestCompletions {
        query: String,
        near: Option<Coordinates>,
    },
    ResolveCompletion {
        request: Uuid,
        completion: SearchCompletion,
    },
    RequestRoute {
        request: Uuid,
        origin: Coordinates,
        destination: Coordinates,
    },
}

impl Effect {
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::RequestCompletions { .. }
                | Self::ResolveCompletion { .. }
                | Self::RequestRoute { .. }
        )
    }
}
