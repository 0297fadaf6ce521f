use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{AddressSearch, RoutingService},
    config::GoogleMapsConfig,
    entities::{Coordinates, Location, Route, SearchCompletion},
    error::Error,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StructuredFormatting {
    pub main_text: String,
    pub secondary_text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
    pub structured_formatting: Option<StructuredFormatting>,
}

pub type PlaceSuggestions = Vec<PlaceSuggestion>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leg {
    pub distance: TextValue,
    pub duration: TextValue,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Directions {
    pub overview_polyline: EncodedPolyline,
    pub legs: Vec<Leg>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response<T> {
    status: String,
    result: Option<T>,
    predictions: Option<T>,
    routes: Option<T>,
}

impl From<PlaceSuggestion> for SearchCompletion {
    fn from(suggestion: PlaceSuggestion) -> Self {
        let (title, subtitle) = match suggestion.structured_formatting {
            Some(formatting) => (
                formatting.main_text,
                formatting.secondary_text.unwrap_or_default(),
            ),
            None => (suggestion.description, String::new()),
        };

        SearchCompletion::new(title, subtitle, suggestion.place_id)
    }
}

impl From<Place> for Location {
    fn from(place: Place) -> Self {
        let title = place.name.unwrap_or(place.formatted_address);
        Location::new(place.geometry.location, title)
    }
}

fn check_status_code(status_code: u16) -> Result<(), Error> {
    if (400..500).contains(&status_code) {
        return Err(Error::invalid_input_error());
    } else if status_code != 200 {
        return Err(Error::upstream_error());
    }

    Ok(())
}

fn parse_suggestions(data: Response<PlaceSuggestions>) -> Result<Vec<SearchCompletion>, Error> {
    match data.status.as_str() {
        "ZERO_RESULTS" => Ok(vec![]),
        "OK" => Ok(data
            .predictions
            .ok_or_else(Error::upstream_error)?
            .into_iter()
            .map(SearchCompletion::from)
            .collect()),
        _ => Err(Error::upstream_error()),
    }
}

fn parse_place(data: Response<Place>) -> Result<Location, Error> {
    match data.status.as_str() {
        "OK" => Ok(data.result.ok_or_else(Error::upstream_error)?.into()),
        "NOT_FOUND" | "ZERO_RESULTS" => Err(Error::not_found_error()),
        "INVALID_REQUEST" => Err(Error::invalid_input_error()),
        _ => Err(Error::upstream_error()),
    }
}

fn parse_directions(data: Response<Vec<Directions>>) -> Result<Route, Error> {
    match data.status.as_str() {
        "OK" => (),
        "NOT_FOUND" | "ZERO_RESULTS" => return Err(Error::not_found_error()),
        _ => return Err(Error::upstream_error()),
    }

    let directions = data
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or_else(Error::not_found_error)?;

    let points = decode_polyline(&directions.overview_polyline.points)?;
    let distance = directions.legs.iter().map(|leg| leg.distance.value).sum();
    let duration = directions.legs.iter().map(|leg| leg.duration.value).sum();

    let polyline = points
        .into_iter()
        .map(geo_types::Coord::from)
        .collect::<Vec<_>>()
        .into();

    Ok(Route::new(polyline, duration, distance))
}

/// Decodes Google's encoded polyline format (precision 5).
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinates>, Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let (mut lat, mut lng) = (0i64, 0i64);
    let mut points = vec![];

    let next_delta = |index: &mut usize| -> Result<i64, Error> {
        let mut result = 0i64;
        let mut shift = 0;

        loop {
            let byte = *bytes.get(*index).ok_or_else(Error::upstream_error)? as i64 - 63;
            *index += 1;

            if !(0..64).contains(&byte) || shift > 60 {
                return Err(Error::upstream_error());
            }

            result |= (byte & 0x1f) << shift;
            shift += 5;

            if byte < 0x20 {
                break;
            }
        }

        Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
    };

    while index < bytes.len() {
        lat += next_delta(&mut index)?;
        lng += next_delta(&mut index)?;
        points.push(Coordinates::new(lat as f64 / 1e5, lng as f64 / 1e5));
    }

    Ok(points)
}

/// Places and Directions web services.
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    radius: f64,
    session_token: Mutex<Uuid>,
}

impl GoogleMaps {
    pub fn new(config: &GoogleMapsConfig, radius: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            radius,
            session_token: Mutex::new(Uuid::new_v4()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("https://{}/maps/api/{}/json", self.api_base, path)
    }

    fn session_token(&self) -> String {
        self.session_token
            .lock()
            .map(|token| token.to_string())
            .unwrap_or_default()
    }

    /// A details request ends the autocomplete session.
    fn rotate_session_token(&self) {
        if let Ok(mut token) = self.session_token.lock() {
            *token = Uuid::new_v4();
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_place_suggestions(
        &self,
        input: String,
        location: Option<Coordinates>,
    ) -> Result<Vec<SearchCompletion>, Error> {
        let mut request = self
            .client
            .get(self.url("place/autocomplete"))
            .query(&[("key", self.api_key.as_str())])
            .query(&[("input", input.as_str())])
            .query(&[("sessiontoken", self.session_token())]);

        if let Some(location) = location {
            let location: String = location.into();
            request = request
                .query(&[("location", location)])
                .query(&[("radius", self.radius)]);
        }

        let res = request.send().await?;
        check_status_code(res.status().as_u16())?;

        parse_suggestions(res.json().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_place(&self, id: String) -> Result<Location, Error> {
        let res = self
            .client
            .get(self.url("place/details"))
            .query(&[("key", self.api_key.as_str())])
            .query(&[("sessiontoken", self.session_token())])
            .query(&[("place_id", id.as_str())])
            .query(&[("fields", "place_id,name,formatted_address,geometry")])
            .send()
            .await?;

        self.rotate_session_token();
        check_status_code(res.status().as_u16())?;

        parse_place(res.json().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Route, Error> {
        let origin: String = origin.into();
        let destination: String = destination.into();

        let res = self
            .client
            .get(self.url("directions"))
            .query(&[("key", self.api_key.as_str())])
            .query(&[("origin", origin.as_str())])
            .query(&[("destination", destination.as_str())])
            .query(&[("mode", "driving")])
            .send()
            .await?;

        check_status_code(res.status().as_u16())?;

        parse_directions(res.json().await?)
    }
}

#[async_trait]
impl AddressSearch for GoogleMaps {
    async fn complete(
        &self,
        query: String,
        near: Option<Coordinates>,
    ) -> Result<Vec<SearchCompletion>, Error> {
        self.find_place_suggestions(query, near).await
    }

    async fn resolve(&self, completion: SearchCompletion) -> Result<Location, Error> {
        self.find_place(completion.handle).await
    }
}

#[async_trait]
impl RoutingService for GoogleMaps {
    async fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error> {
        self.find_directions(origin, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_reference_polyline() {
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();

        assert_eq!(
            points,
            vec![
                Coordinates::new(38.5, -120.2),
                Coordinates::new(40.7, -120.95),
                Coordinates::new(43.252, -126.453),
            ]
        );
    }

    #[test]
    fn rejects_truncated_polyline() {
        assert!(decode_polyline("_p~iF~ps|U_").is_err());
        assert_eq!(decode_polyline("").unwrap(), vec![]);
    }

    #[test]
    fn suggestions_become_completions() {
        let data: Response<PlaceSuggestions> = serde_json::from_value(json!({
            "status": "OK",
            "predictions": [
                {
                    "place_id": "ChIJWTGPjmaAhYARxz6l1hOj92w",
                    "description": "Ferry Building, San Francisco, CA, USA",
                    "structured_formatting": {
                        "main_text": "Ferry Building",
                        "secondary_text": "San Francisco, CA, USA"
                    }
                },
                {
                    "place_id": "abc",
                    "description": "Coit Tower"
                }
            ]
        }))
        .unwrap();

        let completions = parse_suggestions(data).unwrap();

        assert_eq!(
            completions,
            vec![
                SearchCompletion::new(
                    "Ferry Building".into(),
                    "San Francisco, CA, USA".into(),
                    "ChIJWTGPjmaAhYARxz6l1hOj92w".into()
                ),
                SearchCompletion::new("Coit Tower".into(), "".into(), "abc".into()),
            ]
        );
    }

    #[test]
    fn zero_suggestions_is_empty() {
        let data: Response<PlaceSuggestions> =
            serde_json::from_value(json!({ "status": "ZERO_RESULTS", "predictions": [] })).unwrap();
        assert!(parse_suggestions(data).unwrap().is_empty());

        let data: Response<PlaceSuggestions> =
            serde_json::from_value(json!({ "status": "REQUEST_DENIED" })).unwrap();
        assert_eq!(parse_suggestions(data).unwrap_err(), Error::upstream_error());
    }

    #[test]
    fn place_details_become_location() {
        let data: Response<Place> = serde_json::from_value(json!({
            "status": "OK",
            "result": {
                "place_id": "ChIJWTGPjmaAhYARxz6l1hOj92w",
                "name": "Ferry Building",
                "formatted_address": "1 Ferry Building, San Francisco, CA 94111, USA",
                "geometry": { "location": { "lat": 37.7955, "lng": -122.3937 } }
            }
        }))
        .unwrap();

        let location = parse_place(data).unwrap();

        assert_eq!(location.title, "Ferry Building");
        assert_eq!(location.coordinates, Coordinates::new(37.7955, -122.3937));

        let data: Response<Place> =
            serde_json::from_value(json!({ "status": "NOT_FOUND" })).unwrap();
        assert!(parse_place(data).unwrap_err().is_not_found_error());
    }

    #[test]
    fn directions_become_route() {
        let data: Response<Vec<Directions>> = serde_json::from_value(json!({
            "status": "OK",
            "routes": [{
                "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
                "legs": [
                    { "distance": { "text": "1.5 mi", "value": 2414.0 },
                      "duration": { "text": "9 mins", "value": 540.0 } }
                ]
            }]
        }))
        .unwrap();

        let route = parse_directions(data).unwrap();

        assert_eq!(route.distance, 2414.0);
        assert_eq!(route.expected_travel_time, 540.0);
        assert_eq!(route.start(), Some(Coordinates::new(38.5, -120.2)));
        assert_eq!(route.polyline.0.len(), 3);
    }

    #[test]
    fn no_route_is_not_found() {
        let data: Response<Vec<Directions>> =
            serde_json::from_value(json!({ "status": "ZERO_RESULTS", "routes": [] })).unwrap();
        assert!(parse_directions(data).unwrap_err().is_not_found_error());
    }

    #[test]
    fn status_codes() {
        assert!(check_status_code(200).is_ok());
        assert_eq!(check_status_code(404).unwrap_err(), Error::invalid_input_error());
        assert_eq!(check_status_code(503).unwrap_err(), Error::upstream_error());
    }
}
