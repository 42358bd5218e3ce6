//! Coordinate enrichment through a Nominatim-compatible geocoder.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;

use dealerdb_core::Coordinates;

/// Resolves a free-form German address to WGS84 coordinates.
///
/// Enrichment is strictly best-effort: every failure mode (transport,
/// non-2xx status, unparseable body, no results, out-of-range values)
/// collapses to `None` and the candidate proceeds without coordinates.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
}

/// One result row from the `/search` endpoint. Coordinates arrive as
/// strings on the wire.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

impl Geocoder {
    /// # Errors
    ///
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up coordinates for a street/city/postal triple.
    pub async fn resolve(&self, street: &str, city: &str, postal_code: &str) -> Option<Coordinates> {
        let query = format!("{street}, {postal_code} {city}, Germany");
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            utf8_percent_encode(&query, NON_ALPHANUMERIC),
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(query = %query, error = %e, "geocode request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(query = %query, status = %response.status(), "geocode request rejected");
            return None;
        }

        let hits: Vec<GeocodeHit> = match response.json().await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::debug!(query = %query, error = %e, "geocode response unreadable");
                return None;
            }
        };
        let hit = hits.into_iter().next()?;

        let (Ok(latitude), Ok(longitude)) = (hit.lat.parse::<f64>(), hit.lon.parse::<f64>())
        else {
            tracing::debug!(query = %query, "geocode coordinates not numeric");
            return None;
        };
        let coordinates = Coordinates {
            longitude,
            latitude,
        };
        if !coordinates.in_range() {
            tracing::debug!(query = %query, "geocode coordinates out of range");
            return None;
        }
        Some(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(base_url: &str) -> Geocoder {
        Geocoder::new(base_url, "dealerdb-test/0.1", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn resolves_first_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "52.5323", "lon": "13.3846"},
                {"lat": "0.0", "lon": "0.0"}
            ])))
            .mount(&server)
            .await;

        let coordinates = geocoder(&server.uri())
            .resolve("Hauptstraße 1", "Berlin", "10115")
            .await
            .unwrap();
        assert!((coordinates.latitude - 52.5323).abs() < f64::EPSILON);
        assert!((coordinates.longitude - 13.3846).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn empty_result_set_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        assert!(geocoder(&server.uri())
            .resolve("Nirgendwo 1", "Nirgendstadt", "99999")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn server_error_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(geocoder(&server.uri())
            .resolve("Hauptstraße 1", "Berlin", "10115")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn non_numeric_coordinates_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "not-a-number", "lon": "13.3846"}
            ])))
            .mount(&server)
            .await;

        assert!(geocoder(&server.uri())
            .resolve("Hauptstraße 1", "Berlin", "10115")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn out_of_range_coordinates_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "91.0", "lon": "13.3846"}
            ])))
            .mount(&server)
            .await;

        assert!(geocoder(&server.uri())
            .resolve("Hauptstraße 1", "Berlin", "10115")
            .await
            .is_none());
    }
}
