mod event;
mod notice;
mod state;
mod view;

pub use event::{Effect, Event};
pub use notice::{Notice, NoticeKind};
pub use state::MapState;
pub use view::{clock_time, ActionButton, Panel, RideOption, RideRequestSheet, View};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{
    Coordinates, EdgePadding, Location, MapRegion, RideTier, Route, SearchCompletion,
};
use crate::error::Error;

/// The map screen's interaction state. `apply` is the only way to change
/// it; every call is one atomic transition.
#[derive(Clone, Debug, Default)]
pub struct Session {
    state: MapState,
    user_location: Option<Coordinates>,
    user_region: Option<MapRegion>,
    location_denied: bool,
    query: String,
    results: Vec<SearchCompletion>,
    pending_resolution: Option<Uuid>,
    notice: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn destination(&self) -> Option<&Location> {
        self.state.destination()
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchCompletion] {
        &self.results
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn pending_resolution(&self) -> Option<Uuid> {
        self.pending_resolution
    }

    /// Routed distance once a route is drawn, straight-line distance while
    /// only a destination is known.
    pub fn trip_distance(&self) -> Option<f64> {
        match &self.state {
            MapState::RouteDrawn { route, .. } => Some(route.distance),
            MapState::DestinationChosen { destination, .. } => self
                .user_location
                .map(|origin| origin.distance_to(&destination.coordinates)),
            _ => None,
        }
    }

    #[tracing::instrument(skip_all, fields(event = event.name(), state = self.state.name()))]
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let effects = match event {
            Event::LocationUpdated(coordinates) => self.on_location_updated(coordinates),
            Event::LocationDenied => self.on_location_denied(),
            Event::SearchActivated => self.on_search_activated(),
            Event::QueryChanged(query) => self.on_query_changed(query),
            Event::CompletionsUpdated { query, result } => {
                self.on_completions_updated(query, result)
            }
            Event::CompletionSelected(completion) => self.on_completion_selected(completion),
            Event::DestinationResolved { request, result } => {
                self.on_destination_resolved(request, result)
            }
            Event::DestinationSelected(location) => self.select_destination(location),
            Event::RouteResolved {
                request,
                result,
                received_at,
            } => self.on_route_resolved(request, result, received_at),
            Event::RetryRoute => self.on_retry_route(),
            Event::TierSelected(tier) => self.on_tier_selected(tier),
            Event::NoticeDismissed => {
                self.notice = None;
                vec![]
            }
            Event::Back => self.on_back(),
        };

        tracing::debug!(next = self.state.name(), effects = effects.len(), "applied");

        effects
    }

    fn on_location_updated(&mut self, coordinates: Coordinates) -> Vec<Effect> {
        let region = MapRegion::around(coordinates);
        let first_fix = self.user_location.is_none();

        self.user_location = Some(coordinates);
        self.user_region = Some(region);
        self.location_denied = false;

        if matches!(
            self.notice.as_ref().map(|notice| notice.kind),
            Some(NoticeKind::AwaitingLocation) | Some(NoticeKind::LocationPermissionDenied)
        ) {
            self.notice = None;
        }

        let mut effects = vec![];

        match &self.state {
            MapState::Idle => effects.push(Effect::Recenter(region)),
            MapState::DestinationChosen {
                destination,
                route_request: None,
            } if first_fix => {
                let destination = destination.clone();
                let route_request = self.request_route(&destination, &mut effects);
                self.state = MapState::DestinationChosen {
                    destination,
                    route_request,
                };
            }
            _ => (),
        }

        effects
    }

    fn on_location_denied(&mut self) -> Vec<Effect> {
        self.location_denied = true;
        self.show(Notice::location_permission_denied())
    }

    fn on_search_activated(&mut self) -> Vec<Effect> {
        if !self.state.is_idle() {
            tracing::debug!("search can only be activated from idle");
            return vec![];
        }

        self.state = MapState::Searching;
        self.notice = None;
        vec![]
    }

    fn on_query_changed(&mut self, query: String) -> Vec<Effect> {
        if self.state != MapState::Searching {
            return vec![];
        }

        self.query = query;

        if self.query.trim().is_empty() {
            self.results.clear();
            return vec![];
        }

        vec![Effect::RequestCompletions {
            query: self.query.clone(),
            near: self.user_location,
        }]
    }

    fn on_completions_updated(
        &mut self,
        query: String,
        result: Result<Vec<SearchCompletion>, Error>,
    ) -> Vec<Effect> {
        if self.state != MapState::Searching || query != self.query {
            tracing::debug!(%query, "dropping completions for a stale query");
            return vec![];
        }

        match result {
            Ok(results) => {
                self.results = results;
                if self.notice_is(NoticeKind::SearchUnavailable) {
                    self.notice = None;
                }
                vec![]
            }
            Err(err) => {
                tracing::warn!(?err, "address completion failed");
                self.show(Notice::search_unavailable(&err))
            }
        }
    }

    fn on_completion_selected(&mut self, completion: SearchCompletion) -> Vec<Effect> {
        if self.state != MapState::Searching {
            return vec![];
        }

        let request = Uuid::new_v4();
        self.pending_resolution = Some(request);

        vec![Effect::ResolveCompletion {
            request,
            completion,
        }]
    }

    fn on_destination_resolved(
        &mut self,
        request: Uuid,
        result: Result<Location, Error>,
    ) -> Vec<Effect> {
        if self.pending_resolution != Some(request) {
            tracing::debug!(%request, "dropping stale address resolution");
            return vec![];
        }

        self.pending_resolution = None;

        match result {
            Ok(location) => self.select_destination(location),
            Err(err) => {
                tracing::warn!(?err, "address resolution failed");
                self.show(Notice::address_not_found(&err))
            }
        }
    }

    fn select_destination(&mut self, destination: Location) -> Vec<Effect> {
        let mut effects = vec![];

        if self.state.has_overlays() {
            effects.push(Effect::ClearOverlays);
        }

        self.pending_resolution = None;
        self.query.clear();
        self.results.clear();
        self.notice = None;

        effects.push(Effect::PlaceMarker(destination.coordinates));

        let route_request = self.request_route(&destination, &mut effects);
        self.state = MapState::DestinationChosen {
            destination,
            route_request,
        };

        effects
    }

    fn request_route(&mut self, destination: &Location, effects: &mut Vec<Effect>) -> Option<Uuid> {
        match self.user_location {
            Some(origin) => {
                let request = Uuid::new_v4();
                effects.push(Effect::RequestRoute {
                    request,
                    origin,
                    destination: destination.coordinates,
                });
                Some(request)
            }
            None => {
                let notice = if self.location_denied {
                    Notice::location_permission_denied()
                } else {
                    Notice::awaiting_location()
                };
                effects.extend(self.show(notice));
                None
            }
        }
    }

    fn on_route_resolved(
        &mut self,
        request: Uuid,
        result: Result<Route, Error>,
        received_at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let destination = match &self.state {
            MapState::DestinationChosen {
                destination,
                route_request: Some(pending),
            } if *pending == request => destination.clone(),
            _ => {
                tracing::debug!(%request, "dropping stale route");
                return vec![];
            }
        };

        match result {
            Ok(route) => {
                let mut effects = vec![Effect::DrawRoute(route.polyline.clone())];

                if let Some(region) =
                    MapRegion::fitting(&route.polyline, EdgePadding::ride_request_sheet())
                {
                    effects.push(Effect::FitRegion(region));
                }

                self.notice = None;
                self.state = MapState::RouteDrawn {
                    destination,
                    route,
                    received_at,
                    selected_tier: RideTier::default(),
                };

                effects
            }
            Err(err) => {
                tracing::warn!(?err, destination = %destination.title, "routing failed");

                self.state = MapState::DestinationChosen {
                    destination,
                    route_request: None,
                };

                self.show(Notice::route_unavailable(&err))
            }
        }
    }

    fn on_retry_route(&mut self) -> Vec<Effect> {
        let destination = match &self.state {
            MapState::DestinationChosen {
                destination,
                route_request: None,
            } => destination.clone(),
            _ => return vec![],
        };

        self.notice = None;

        let mut effects = vec![];
        let route_request = self.request_route(&destination, &mut effects);
        self.state = MapState::DestinationChosen {
            destination,
            route_request,
        };

        effects
    }

    fn on_tier_selected(&mut self, tier: RideTier) -> Vec<Effect> {
        if let MapState::RouteDrawn { selected_tier, .. } = &mut self.state {
            *selected_tier = tier;
        }

        vec![]
    }

    fn on_back(&mut self) -> Vec<Effect> {
        if self.state.is_idle() {
            return vec![];
        }

        self.state = MapState::Idle;
        self.pending_resolution = None;
        self.query.clear();
        self.results.clear();
        self.notice = None;

        let mut effects = vec![Effect::ClearOverlays];
        if let Some(region) = self.user_region {
            effects.push(Effect::Recenter(region));
        }

        effects
    }

    fn show(&mut self, notice: Notice) -> Vec<Effect> {
        self.notice = Some(notice.clone());
        vec![Effect::ShowNotice(notice)]
    }

    fn notice_is(&self, kind: NoticeKind) -> bool {
        matches!(&self.notice, Some(notice) if notice.kind == kind)
    }

    pub fn view(&self) -> View {
        View::of(self)
    }
}
