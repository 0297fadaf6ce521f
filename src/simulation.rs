use std::sync::Arc;
use std::time::Duration;

use async_channel::Receiver;
use async_trait::async_trait;
use rand_distr::{Bernoulli, Distribution, Normal};

use crate::{
    api::{AddressSearch, Collaborators, RoutingService},
    config::Config,
    engine::{Handle, Render},
    entities::{Coordinates, Location, RideTier, Route, SearchCompletion},
    error::Error,
    external::StaticLocation,
    session::{Effect, NoticeKind, Panel, RideRequestSheet, View},
};

const SUBTITLE: &str = "San Francisco, CA";
const MAX_ROUTE_RETRIES: usize = 3;

fn gazetteer() -> Vec<Location> {
    [
        ("Ferry Building", 37.7955, -122.3937),
        ("Coit Tower", 37.8024, -122.4058),
        ("Oracle Park", 37.7786, -122.3893),
        ("Palace of Fine Arts", 37.8029, -122.4484),
        ("Golden Gate Park", 37.7694, -122.4862),
        ("Twin Peaks", 37.7544, -122.4477),
        ("Fisherman's Wharf", 37.8080, -122.4177),
        ("Mission Dolores Park", 37.7596, -122.4269),
    ]
    .into_iter()
    .map(|(title, lat, lng)| Location::new(Coordinates::new(lat, lng), title.into()))
    .collect()
}

/// Artificial response delay, normally distributed and clamped at zero.
#[derive(Clone, Copy, Debug)]
pub struct Latency {
    distribution: Option<Normal<f64>>,
}

impl Latency {
    pub fn none() -> Self {
        Self { distribution: None }
    }

    pub fn normal(mean_ms: f64, std_dev_ms: f64) -> Result<Self, Error> {
        if !(mean_ms.is_finite() && std_dev_ms.is_finite() && std_dev_ms >= 0.0) {
            return Err(Error::invalid_input_error());
        }

        let distribution =
            Normal::new(mean_ms, std_dev_ms).map_err(|_| Error::invalid_input_error())?;

        Ok(Self {
            distribution: Some(distribution),
        })
    }

    fn sample(&self) -> Duration {
        match &self.distribution {
            Some(distribution) => {
                let millis = distribution.sample(&mut rand::thread_rng()).max(0.0);
                Duration::from_micros((millis * 1000.0) as u64)
            }
            None => Duration::ZERO,
        }
    }

    async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Address search over a fixed list of San Francisco landmarks.
pub struct SimulatedSearch {
    places: Vec<Location>,
    latency: Latency,
}

impl SimulatedSearch {
    pub fn new(latency: Latency) -> Self {
        Self {
            places: gazetteer(),
            latency,
        }
    }
}

#[async_trait]
impl AddressSearch for SimulatedSearch {
    #[tracing::instrument(skip(self))]
    async fn complete(
        &self,
        query: String,
        near: Option<Coordinates>,
    ) -> Result<Vec<SearchCompletion>, Error> {
        self.latency.wait().await;

        let needle = query.trim().to_lowercase();

        let mut matches: Vec<(usize, &Location)> = self
            .places
            .iter()
            .enumerate()
            .filter(|(_, place)| place.title.to_lowercase().contains(&needle))
            .collect();

        if let Some(near) = near {
            matches.sort_by(|(_, a), (_, b)| {
                near.distance_to(&a.coordinates)
                    .total_cmp(&near.distance_to(&b.coordinates))
            });
        }

        Ok(matches
            .into_iter()
            .map(|(index, place)| {
                SearchCompletion::new(place.title.clone(), SUBTITLE.into(), index.to_string())
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn resolve(&self, completion: SearchCompletion) -> Result<Location, Error> {
        self.latency.wait().await;

        let index: usize = completion
            .handle
            .parse()
            .map_err(|_| Error::invalid_input_error())?;

        self.places
            .get(index)
            .cloned()
            .ok_or_else(Error::not_found_error)
    }
}

/// Routes along two legs (north-south, then east-west) at a fixed speed.
pub struct SimulatedRouting {
    speed: f64,
    latency: Latency,
    failure: Bernoulli,
}

impl SimulatedRouting {
    /// `speed` in meters per second, `failure_rate` in `[0, 1]`.
    pub fn new(speed: f64, latency: Latency, failure_rate: f64) -> Result<Self, Error> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(Error::invalid_input_error());
        }

        let failure = Bernoulli::new(failure_rate).map_err(|_| Error::invalid_input_error())?;

        Ok(Self {
            speed,
            latency,
            failure,
        })
    }

    fn fails(&self) -> bool {
        self.failure.sample(&mut rand::thread_rng())
    }
}

#[async_trait]
impl RoutingService for SimulatedRouting {
    #[tracing::instrument(skip(self))]
    async fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error> {
        self.latency.wait().await;

        if self.fails() {
            tracing::warn!("simulated routing failure");
            return Err(Error::upstream_error());
        }

        let corner = Coordinates::new(destination.lat, origin.lng);
        let mut route = Route::from_points(&[origin, corner, destination], 0.0);
        route.expected_travel_time = route.distance / self.speed;

        Ok(route)
    }
}

/// Collaborators backed entirely by the simulation.
pub fn collaborators(config: &Config) -> Result<Collaborators, Error> {
    Ok(Collaborators {
        location: Arc::new(StaticLocation::fixed(config.origin)),
        search: Arc::new(SimulatedSearch::new(Latency::normal(120.0, 40.0)?)),
        routing: Arc::new(SimulatedRouting::new(
            8.0,
            Latency::normal(400.0, 150.0)?,
            0.2,
        )?),
    })
}

async fn next_render(renders: &Receiver<Render>) -> Result<Render, Error> {
    renders
        .recv()
        .await
        .map_err(|_| Error::invalid_state_error())
}

fn failed(render: &Render, kind: NoticeKind) -> bool {
    render
        .effects
        .iter()
        .any(|effect| matches!(effect, Effect::ShowNotice(notice) if notice.kind == kind))
}

/// Drives one trip request through the engine the way a rider would:
/// search, pick the first result, wait for the fare sheet, choose a tier and
/// back out. Routing failures are retried a few times.
#[tracing::instrument(skip(handle, renders))]
pub async fn run_scenario(
    handle: &Handle,
    renders: &Receiver<Render>,
    query: &str,
) -> Result<RideRequestSheet, Error> {
    handle.activate_search().await?;
    handle.set_query(query).await?;

    let completion = loop {
        let render = next_render(renders).await?;

        if failed(&render, NoticeKind::SearchUnavailable) {
            return Err(Error::upstream_error());
        }

        if let Panel::SearchBox { results, .. } = &render.view.panel {
            if let Some(first) = results.first() {
                break first.clone();
            }
        }
    };

    tracing::info!(title = %completion.title, "selecting search result");
    handle.select_completion(completion).await?;

    let mut retries = 0;
    let sheet = loop {
        let render = next_render(renders).await?;

        if failed(&render, NoticeKind::AddressNotFound) {
            return Err(Error::not_found_error());
        }

        if failed(&render, NoticeKind::RouteUnavailable) {
            if retries == MAX_ROUTE_RETRIES {
                return Err(Error::upstream_error());
            }

            retries += 1;
            tracing::info!(retries, "retrying route");
            handle.retry_route().await?;
            continue;
        }

        if let Panel::RideRequestSheet(sheet) = render.view.panel {
            break sheet;
        }
    };

    for option in &sheet.options {
        tracing::info!(tier = option.title, price = %option.price, "ride option");
    }
    tracing::info!(
        pickup = %sheet.pickup_time(),
        dropoff = %sheet.dropoff_time(),
        destination = %sheet.destination_title,
        "trip times"
    );

    handle.select_tier(RideTier::Premium).await?;
    handle.back().await?;

    loop {
        let View { state, .. } = next_render(renders).await?.view;
        if state == "idle" {
            break;
        }
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn search_matches_titles_nearest_first() {
        let search = SimulatedSearch::new(Latency::none());
        let near = Some(Coordinates::new(37.8080, -122.4177));

        let results = block_on(search.complete("park".into(), near)).unwrap();

        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Oracle Park", "Mission Dolores Park", "Golden Gate Park"]
        );
        assert!(results.iter().all(|r| r.subtitle == SUBTITLE));
    }

    #[test]
    fn resolves_handles() {
        let search = SimulatedSearch::new(Latency::none());
        let results = block_on(search.complete("ferry".into(), None)).unwrap();

        let location = block_on(search.resolve(results[0].clone())).unwrap();
        assert_eq!(location.title, "Ferry Building");

        let bogus = SearchCompletion::new("x".into(), "".into(), "99".into());
        assert!(block_on(search.resolve(bogus)).unwrap_err().is_not_found_error());
    }

    #[test]
    fn routes_at_fixed_speed() {
        let routing = SimulatedRouting::new(10.0, Latency::none(), 0.0).unwrap();
        let origin = Coordinates::new(37.7749, -122.4194);
        let destination = Coordinates::new(37.7955, -122.3937);

        let route = block_on(routing.route(origin, destination)).unwrap();

        assert_eq!(route.start(), Some(origin));
        assert_eq!(route.end(), Some(destination));
        assert!(route.distance > origin.distance_to(&destination));
        assert!((route.expected_travel_time - route.distance / 10.0).abs() < 1e-9);
    }

    #[test]
    fn always_failing_routing() {
        let routing = SimulatedRouting::new(10.0, Latency::none(), 1.0).unwrap();
        let origin = Coordinates::new(37.7749, -122.4194);

        let err = block_on(routing.route(origin, origin)).unwrap_err();
        assert_eq!(err, Error::upstream_error());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(SimulatedRouting::new(0.0, Latency::none(), 0.0).is_err());
        assert!(SimulatedRouting::new(10.0, Latency::none(), 1.5).is_err());
        assert!(Latency::normal(100.0, -1.0).is_err());
        assert!(Latency::normal(f64::NAN, 10.0).is_err());
        assert!(Latency::normal(100.0, 0.0).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_reaches_fare_sheet() {
        use crate::engine::Engine;

        let config = Config::default();
        let collaborators = Collaborators {
            location: Arc::new(StaticLocation::fixed(config.origin)),
            search: Arc::new(SimulatedSearch::new(Latency::normal(120.0, 40.0).unwrap())),
            routing: Arc::new(
                SimulatedRouting::new(8.0, Latency::normal(400.0, 150.0).unwrap(), 0.0).unwrap(),
            ),
        };
        let (engine, handle, renders) = Engine::new(&config, collaborators);
        let task = tokio::spawn(engine.run());

        let sheet = run_scenario(&handle, &renders, "ferry").await.unwrap();
        handle.shutdown().await.unwrap();
        let session = task.await.unwrap();

        assert_eq!(sheet.destination_title, "Ferry Building");
        assert_eq!(sheet.options.len(), 3);
        assert!(session.state().is_idle());
    }
}
