use std::fmt::Display;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::Serialize;

use crate::entities::{Fare, Location, RideTier, SearchCompletion};
use crate::session::{MapState, Notice, Session};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Panel {
    ActivationPill,
    SearchBox {
        query: String,
        results: Vec<SearchCompletion>,
    },
    /// Fares here are provisional, priced on the straight-line distance.
    RoutePending {
        destination: Location,
        estimates: Vec<RideOption>,
    },
    RideRequestSheet(RideRequestSheet),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionButton {
    Menu,
    Back,
}

impl ActionButton {
    pub fn image_name(&self) -> &'static str {
        match self {
            Self::Menu => "line.3.horizontal",
            Self::Back => "arrow.left",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RideOption {
    pub tier: RideTier,
    pub title: &'static str,
    pub image_name: &'static str,
    pub fare: Fare,
    pub price: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RideRequestSheet {
    pub origin_title: String,
    pub destination_title: String,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    pub options: Vec<RideOption>,
    pub selected: RideTier,
}

impl RideRequestSheet {
    pub fn pickup_time(&self) -> String {
        clock_time(&self.pickup_at.with_timezone(&Local))
    }

    pub fn dropoff_time(&self) -> String {
        clock_time(&self.dropoff_at.with_timezone(&Local))
    }

    pub fn selected_option(&self) -> Option<&RideOption> {
        self.options.iter().find(|option| option.tier == self.selected)
    }
}

/// Everything the screen needs to draw itself for the current state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct View {
    pub state: &'static str,
    pub panel: Panel,
    pub action_button: ActionButton,
    pub notice: Option<Notice>,
}

impl View {
    pub fn of(session: &Session) -> Self {
        let panel = match session.state() {
            MapState::Idle => Panel::ActivationPill,
            MapState::Searching => Panel::SearchBox {
                query: session.query().to_string(),
                results: session.results().to_vec(),
            },
            MapState::DestinationChosen { destination, .. } => Panel::RoutePending {
                destination: destination.clone(),
                estimates: ride_options(session.trip_distance()),
            },
            MapState::RouteDrawn {
                destination,
                route,
                received_at,
                selected_tier,
            } => {
                let options = ride_options(session.trip_distance());
                let dropoff_at = received_at
                    .checked_add_signed(travel_duration(route.expected_travel_time))
                    .unwrap_or(*received_at);

                Panel::RideRequestSheet(RideRequestSheet {
                    origin_title: "Current location".into(),
                    destination_title: destination.title.clone(),
                    pickup_at: *received_at,
                    dropoff_at,
                    options,
                    selected: *selected_tier,
                })
            }
        };

        let action_button = match session.state() {
            MapState::Idle => ActionButton::Menu,
            _ => ActionButton::Back,
        };

        Self {
            state: session.state().name(),
            panel,
            action_button,
            notice: session.notice().cloned(),
        }
    }
}

const MAX_TRAVEL_SECONDS: f64 = 7.0 * 24.0 * 3600.0;

fn ride_options(distance: Option<f64>) -> Vec<RideOption> {
    RideTier::ALL
        .iter()
        .map(|tier| {
            let fare = tier.fare(distance);
            RideOption {
                tier: *tier,
                title: tier.name(),
                image_name: tier.image_name(),
                fare,
                price: fare.to_string(),
            }
        })
        .collect()
}

/// Travel time as a duration, with nonsense clamped to `[0, one week]`.
fn travel_duration(seconds: f64) -> Duration {
    if !seconds.is_finite() {
        return Duration::zero();
    }

    let seconds = seconds.clamp(0.0, MAX_TRAVEL_SECONDS);
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// Formats a timestamp as a wall-clock time, e.g. `1:30 PM`.
pub fn clock_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Coordinates, Route};
    use crate::session::Event;

    fn sheet_for(distance_meters: f64, travel_seconds: f64) -> RideRequestSheet {
        let origin = Coordinates::new(37.7749, -122.4194);
        let destination = Location::new(Coordinates::new(37.7955, -122.3937), "Ferry Building".into());
        let route = Route::new(
            vec![(origin.lng, origin.lat), (destination.coordinates.lng, destination.coordinates.lat)]
                .into(),
            travel_seconds,
            distance_meters,
        );

        let mut session = Session::new();
        session.apply(Event::LocationUpdated(origin));
        let effects = session.apply(Event::DestinationSelected(destination));
        let request = session.state().route_request().unwrap();
        assert!(!effects.is_empty());

        session.apply(Event::RouteResolved {
            request,
            result: Ok(route),
            received_at: Utc.with_ymd_and_hms(2022, 12, 28, 21, 30, 0).unwrap(),
        });

        match session.view().panel {
            Panel::RideRequestSheet(sheet) => sheet,
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[test]
    fn idle_view_shows_activation_pill_and_menu() {
        let view = Session::new().view();
        assert_eq!(view.state, "idle");
        assert_eq!(view.panel, Panel::ActivationPill);
        assert_eq!(view.action_button, ActionButton::Menu);
        assert_eq!(view.action_button.image_name(), "line.3.horizontal");
    }

    #[test]
    fn searching_view_shows_search_box_and_back() {
        let mut session = Session::new();
        session.apply(Event::SearchActivated);
        session.apply(Event::QueryChanged("coit".into()));

        let view = session.view();
        assert_eq!(
            view.panel,
            Panel::SearchBox {
                query: "coit".into(),
                results: vec![],
            }
        );
        assert_eq!(view.action_button, ActionButton::Back);
    }

    #[test]
    fn sheet_prices_every_tier() {
        let sheet = sheet_for(2414.0, 900.0);

        let prices: Vec<_> = sheet.options.iter().map(|o| o.price.as_str()).collect();
        assert_eq!(prices, vec!["$7.25", "$23.00", "$12.62"]);
        assert_eq!(sheet.selected, RideTier::Economy);
        assert_eq!(sheet.selected_option().unwrap().price, "$7.25");
        assert_eq!(sheet.destination_title, "Ferry Building");
    }

    #[test]
    fn sheet_times_span_travel_time() {
        let sheet = sheet_for(2414.0, 900.0);

        assert_eq!(sheet.dropoff_at - sheet.pickup_at, Duration::minutes(15));
        assert_eq!(clock_time(&sheet.pickup_at), "9:30 PM");
        assert_eq!(clock_time(&sheet.dropoff_at), "9:45 PM");
    }

    #[test]
    fn pending_route_shows_straight_line_estimates() {
        let origin = Coordinates::new(37.7749, -122.4194);
        let destination = Location::new(Coordinates::new(37.7955, -122.3937), "Ferry Building".into());

        let mut session = Session::new();
        session.apply(Event::LocationUpdated(origin));
        session.apply(Event::DestinationSelected(destination.clone()));

        let straight = origin.distance_to(&destination.coordinates);
        match session.view().panel {
            Panel::RoutePending {
                destination: pending,
                estimates,
            } => {
                assert_eq!(pending, destination);
                assert_eq!(estimates.len(), 3);
                assert_eq!(estimates[0].fare, RideTier::Economy.fare(Some(straight)));
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[test]
    fn absurd_travel_times_are_bounded() {
        assert_eq!(travel_duration(f64::NAN), Duration::zero());
        assert_eq!(travel_duration(-60.0), Duration::zero());
        assert_eq!(travel_duration(f64::MAX), Duration::days(7));

        let sheet = sheet_for(2414.0, 1e300);
        assert_eq!(sheet.dropoff_at - sheet.pickup_at, Duration::days(7));
    }
}
