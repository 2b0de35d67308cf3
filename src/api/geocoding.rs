use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::domain::Coordinates;

pub const GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const USER_AGENT: &str = concat!("stedkart/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding API returned status {0}")]
    Status(u16),

    #[error("invalid geocoding response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("first geocoding result has no [lon, lat] coordinates")]
    MalformedCoordinates,

    #[error("invalid geocoding URL: {0}")]
    InvalidUrl(String),
}

/// Resolves a free-text address to a position.
///
/// `Ok(None)` means the service answered but found nothing.
pub trait ForwardGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

impl<T: ForwardGeocoder + ?Sized> ForwardGeocoder for &T {
    fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        (**self).geocode(query)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    geometry: GeocodingGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodingGeometry {
    coordinates: Vec<f64>,
}

/// Extract the top candidate from a forward-geocoding response body
pub fn parse_geocoding_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let response: GeocodingResponse = serde_json::from_str(body)?;

    let Some(first) = response.features.into_iter().next() else {
        return Ok(None);
    };

    match first.geometry.coordinates.as_slice() {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => {
            Ok(Some(Coordinates::new(*lon, *lat)))
        }
        _ => Err(GeocodeError::MalformedCoordinates),
    }
}

/// Mapbox forward-geocoding client restricted to one country
pub struct MapboxGeocoder {
    client: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
    country_code: String,
}

impl MapboxGeocoder {
    pub fn new(
        base_url: &str,
        access_token: &str,
        country_code: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
            country_code: country_code.to_string(),
        })
    }

    /// `{base_url}/{query}.json?access_token=..&country=..&limit=1`
    ///
    /// The query is percent-encoded as a single path segment.
    pub fn request_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| GeocodeError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| GeocodeError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(&format!("{}.json", query));

        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("country", &self.country_code)
            .append_pair("limit", "1");

        Ok(url)
    }
}

impl ForwardGeocoder for MapboxGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = self.request_url(query)?;

        // The request URL carries the access token; keep it out of error messages
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| GeocodeError::Http(e.without_url()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| GeocodeError::Http(e.without_url()))?;

        parse_geocoding_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geocoding_response() {
        let json = r#"{
            "type": "FeatureCollection",
            "query": ["storgata", "1"],
            "features": [
                {"id": "address.1", "geometry": {"type": "Point", "coordinates": [10.7522, 59.9139]}},
                {"id": "address.2", "geometry": {"type": "Point", "coordinates": [5.0, 60.0]}}
            ]
        }"#;

        let coords = parse_geocoding_response(json).unwrap();
        assert_eq!(coords, Some(Coordinates::new(10.7522, 59.9139)));
    }

    #[test]
    fn test_parse_empty_features() {
        assert_eq!(parse_geocoding_response(r#"{"features": []}"#).unwrap(), None);
        assert_eq!(parse_geocoding_response(r#"{"type": "FeatureCollection"}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(matches!(
            parse_geocoding_response("not json"),
            Err(GeocodeError::Json(_))
        ));
        assert!(matches!(
            parse_geocoding_response(r#"{"features": [{"geometry": {"coordinates": [10.0]}}]}"#),
            Err(GeocodeError::MalformedCoordinates)
        ));
    }

    #[test]
    fn test_request_url() {
        let geocoder =
            MapboxGeocoder::new(GEOCODING_URL, "pk.test", "no", Duration::from_secs(10)).unwrap();
        let url = geocoder
            .request_url("Storgata 1, Tromsø, 9008, Norway")
            .unwrap();

        let last_segment = url.path_segments().unwrap().last().unwrap().to_string();
        assert!(last_segment.starts_with("Storgata%201"));
        assert!(last_segment.contains("Troms%C3%B8"));
        assert!(last_segment.ends_with(".json"));
        assert!(url.path().starts_with("/geocoding/v5/mapbox.places/"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("access_token".to_string(), "pk.test".to_string()),
                ("country".to_string(), "no".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url_keeps_slash_inside_query() {
        let geocoder =
            MapboxGeocoder::new(GEOCODING_URL, "pk.test", "no", Duration::from_secs(10)).unwrap();
        let url = geocoder.request_url("Gate 1/3, Oslo").unwrap();

        assert_eq!(url.path_segments().unwrap().count(), 4);
        assert!(url.path().contains("Gate%201%2F3"));
    }

    mod http {
        use super::*;
        use serde_json::json;
        use tokio::runtime::Runtime;
        use wiremock::matchers::{method, path_regex, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        // The mock server runs on its own thread; the blocking client must be
        // called outside `block_on`.
        fn runtime() -> Runtime {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
        }

        fn mount(rt: &Runtime, server: &MockServer, response: ResponseTemplate) {
            rt.block_on(
                Mock::given(method("GET"))
                    .and(path_regex(r"^/mapbox\.places/[^/]+\.json$"))
                    .and(query_param("access_token", "pk.secret"))
                    .and(query_param("country", "no"))
                    .and(query_param("limit", "1"))
                    .respond_with(response)
                    .mount(server),
            );
        }

        fn geocoder(server: &MockServer) -> MapboxGeocoder {
            let base_url = format!("{}/mapbox.places", server.uri());
            MapboxGeocoder::new(&base_url, "pk.secret", "no", Duration::from_secs(5)).unwrap()
        }

        #[test]
        fn test_geocode_returns_first_candidate() {
            let rt = runtime();
            let server = rt.block_on(MockServer::start());
            let body = json!({
                "type": "FeatureCollection",
                "features": [
                    {"geometry": {"type": "Point", "coordinates": [18.9553, 69.6489]}},
                    {"geometry": {"type": "Point", "coordinates": [5.0, 60.0]}}
                ]
            });
            mount(&rt, &server, ResponseTemplate::new(200).set_body_json(&body));

            let coords = geocoder(&server)
                .geocode("Storgata 1, Tromsø, 9008, Norway")
                .unwrap();
            assert_eq!(coords, Some(Coordinates::new(18.9553, 69.6489)));
        }

        #[test]
        fn test_geocode_empty_features_is_none() {
            let rt = runtime();
            let server = rt.block_on(MockServer::start());
            let body = json!({"type": "FeatureCollection", "features": []});
            mount(&rt, &server, ResponseTemplate::new(200).set_body_json(&body));

            let coords = geocoder(&server).geocode("Ukjent vei 99, Norway").unwrap();
            assert_eq!(coords, None);
        }

        #[test]
        fn test_geocode_server_error_is_status() {
            let rt = runtime();
            let server = rt.block_on(MockServer::start());
            mount(&rt, &server, ResponseTemplate::new(500));

            let result = geocoder(&server).geocode("Gate 1/2, Tromsø");
            assert!(matches!(result, Err(GeocodeError::Status(500))));
        }

        #[test]
        fn test_transport_error_hides_access_token() {
            // Bind and release a port so nothing is listening on it
            let port = {
                let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
                listener.local_addr().unwrap().port()
            };
            let base_url = format!("http://127.0.0.1:{}/mapbox.places", port);
            let geocoder =
                MapboxGeocoder::new(&base_url, "pk.secret", "no", Duration::from_secs(5))
                    .unwrap();

            let error = geocoder.geocode("Gate 1, Oslo").unwrap_err();
            assert!(matches!(error, GeocodeError::Http(_)));

            let display = error.to_string();
            let debug = format!("{:?}", error);
            for text in [&display, &debug] {
                assert!(!text.contains("access_token"), "{text}");
                assert!(!text.contains("pk.secret"), "{text}");
            }
        }
    }
}
