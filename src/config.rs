use std::env;
use std::time::Duration;

use crate::entities::Coordinates;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Simulated,
    Google,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GoogleMapsConfig {
    pub api_base: String,
    pub api_key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub provider: Provider,
    pub google_maps: Option<GoogleMapsConfig>,
    pub origin: Coordinates,
    pub request_timeout: Duration,
    pub search_radius: f64,
    pub demo_query: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Simulated,
            google_maps: None,
            origin: Coordinates::new(37.7749, -122.4194),
            request_timeout: Duration::from_millis(10_000),
            search_radius: 5000.0,
            demo_query: "Ferry Building".into(),
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(provider) = lookup("WAYPOINT_PROVIDER") {
            config.provider = match provider.to_lowercase().as_str() {
                "simulated" => Provider::Simulated,
                "google" => Provider::Google,
                _ => return Err(Error::invalid_input_error()),
            };
        }

        if config.provider == Provider::Google {
            let api_base = lookup("GOOGLE_MAPS_API_BASE").ok_or_else(Error::env_var_error)?;
            let api_key = lookup("GOOGLE_MAPS_API_KEY").ok_or_else(Error::env_var_error)?;
            config.google_maps = Some(GoogleMapsConfig { api_base, api_key });
        }

        if let Some(origin) = lookup("WAYPOINT_ORIGIN") {
            config.origin = parse_coordinates(&origin)?;
        }

        if let Some(timeout) = lookup("WAYPOINT_REQUEST_TIMEOUT_MS") {
            let millis: u64 = timeout
                .trim()
                .parse()
                .map_err(|_| Error::invalid_input_error())?;
            config.request_timeout = Duration::from_millis(millis);
        }

        if let Some(radius) = lookup("WAYPOINT_SEARCH_RADIUS_M") {
            config.search_radius = radius
                .trim()
                .parse()
                .map_err(|_| Error::invalid_input_error())?;
        }

        if let Some(query) = lookup("WAYPOINT_DEMO_QUERY") {
            config.demo_query = query;
        }

        Ok(config)
    }
}

/// Parses `"lat,lng"`.
fn parse_coordinates(s: &str) -> Result<Coordinates, Error> {
    let (lat, lng) = s.split_once(',').ok_or_else(Error::invalid_input_error)?;

    let lat: f64 = lat.trim().parse().map_err(|_| Error::invalid_input_error())?;
    let lng: f64 = lng.trim().parse().map_err(|_| Error::invalid_input_error())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::invalid_input_error());
    }

    Ok(Coordinates::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_simulated() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn google_requires_credentials() {
        let err = Config::from_lookup(lookup(&[("WAYPOINT_PROVIDER", "google")])).unwrap_err();
        assert_eq!(err, Error::env_var_error());

        let config = Config::from_lookup(lookup(&[
            ("WAYPOINT_PROVIDER", "Google"),
            ("GOOGLE_MAPS_API_BASE", "maps.googleapis.com"),
            ("GOOGLE_MAPS_API_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Google);
        assert_eq!(config.google_maps.unwrap().api_base, "maps.googleapis.com");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("WAYPOINT_ORIGIN", "40.7128, -74.0060"),
            ("WAYPOINT_REQUEST_TIMEOUT_MS", "2500"),
            ("WAYPOINT_SEARCH_RADIUS_M", "1200.5"),
        ]))
        .unwrap();

        assert_eq!(config.origin, Coordinates::new(40.7128, -74.0060));
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.search_radius, 1200.5);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("WAYPOINT_PROVIDER", "apple")])).is_err());
        assert!(Config::from_lookup(lookup(&[("WAYPOINT_ORIGIN", "91,0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("WAYPOINT_ORIGIN", "nowhere")])).is_err());
        assert!(Config::from_lookup(lookup(&[("WAYPOINT_REQUEST_TIMEOUT_MS", "-1")])).is_err());
    }
}
