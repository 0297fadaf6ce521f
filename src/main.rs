use std::sync::Arc;

use waypoint::api::Collaborators;
use waypoint::config::{Config, Provider};
use waypoint::engine::Engine;
use waypoint::error::Error;
use waypoint::external::{GoogleMaps, StaticLocation};
use waypoint::simulation::{self, run_scenario};

fn collaborators(config: &Config) -> Result<Collaborators, Error> {
    match (config.provider, &config.google_maps) {
        (Provider::Simulated, _) => simulation::collaborators(config),
        (Provider::Google, Some(google_maps)) => {
            let maps = Arc::new(GoogleMaps::new(google_maps, config.search_radius));

            Ok(Collaborators {
                location: Arc::new(StaticLocation::fixed(config.origin)),
                search: maps.clone(),
                routing: maps,
            })
        }
        (Provider::Google, None) => Err(Error::env_var_error()),
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let (engine, handle, renders) = Engine::new(&config, collaborators(&config)?);
    let task = tokio::spawn(engine.run());

    let deadline = config.request_timeout * 4;
    let outcome = tokio::time::timeout(deadline, run_scenario(&handle, &renders, &config.demo_query))
        .await
        .map_err(Error::from)
        .and_then(|sheet| sheet);

    handle.shutdown().await?;
    task.await.map_err(|_| Error::unexpected_error())?;

    let sheet = outcome?;
    tracing::info!(destination = %sheet.destination_title, "trip quoted");

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            std::process::exit(2);
        }
    };

    tracing::info!(provider = ?config.provider, "starting");

    if let Err(err) = run(config).await {
        tracing::error!(%err, "scenario failed");
        std::process::exit(1);
    }
}
