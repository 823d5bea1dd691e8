//! Client for a Nominatim-compatible geocoding service.
//!
//! Backs the `/reverse-geocode` and `/search-address` proxy endpoints the
//! storefront uses to turn a map pin into a delivery address.

use std::sync::Arc;

use reqwest::{
    StatusCode, Url,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{dto::geocode::GeocodedAddress, error::AppError};

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no address found")]
    NotFound,

    #[error("invalid geocoder url: {0}")]
    InvalidUrl(String),

    #[error("malformed geocoder response: {0}")]
    Parse(String),
}

impl From<GeocodingError> for AppError {
    fn from(err: GeocodingError) -> Self {
        match err {
            GeocodingError::NotFound => AppError::NotFound,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// A place as returned by Nominatim `format=jsonv2` with `addressdetails=1`.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub country_code: Option<String>,
}

/// Reverse lookups answer `{"error": "..."}` with status 200 when nothing matches.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Place(NominatimPlace),
    Error { error: String },
}

impl TryFrom<NominatimPlace> for GeocodedAddress {
    type Error = GeocodingError;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodingError::Parse(format!("latitude {:?}", place.lat)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodingError::Parse(format!("longitude {:?}", place.lon)))?;
        let NominatimAddress {
            city,
            town,
            village,
            country_code,
        } = place.address;

        Ok(GeocodedAddress {
            display_name: place.display_name,
            city: city.or(town).or(village),
            country_code: country_code.map(|code| code.to_lowercase()),
            latitude,
            longitude,
        })
    }
}

#[derive(Clone)]
pub struct GeocodingClient {
    inner: Arc<GeocodingClientInner>,
}

struct GeocodingClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl GeocodingClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, GeocodingError> {
        // Nominatim's usage policy requires an identifying User-Agent.
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| GeocodingError::InvalidUrl(format!("user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| GeocodingError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(GeocodingClientInner { client, base_url }),
        })
    }

    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<GeocodedAddress, GeocodingError> {
        let url = self.endpoint(
            "reverse",
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("addressdetails", "1".to_string()),
            ],
        )?;

        let response = self.inner.client.get(url).send().await?;
        let body: ReverseResponse = Self::handle_response(response).await?;
        match body {
            ReverseResponse::Place(place) => place.try_into(),
            ReverseResponse::Error { error } => {
                tracing::debug!(lat, lon, error = %error, "reverse geocode found nothing");
                Err(GeocodingError::NotFound)
            }
        }
    }

    pub async fn search(
        &self,
        query: &str,
        limit: u8,
    ) -> Result<Vec<GeocodedAddress>, GeocodingError> {
        let url = self.endpoint(
            "search",
            &[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("addressdetails", "1".to_string()),
            ],
        )?;

        let response = self.inner.client.get(url).send().await?;
        let places: Vec<NominatimPlace> = Self::handle_response(response).await?;
        places.into_iter().map(GeocodedAddress::try_from).collect()
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, GeocodingError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GeocodingError::InvalidUrl("base url cannot have paths".into()))?
            .pop_if_empty()
            .push(path);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "jsonv2");
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeocodingError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GeocodingError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodingError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GeocodingError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_falls_back_to_town_and_lowercases_country() {
        let place: NominatimPlace = serde_json::from_value(serde_json::json!({
            "display_name": "Lenina 1, Suzdal",
            "lat": "56.4197",
            "lon": "40.4494",
            "address": { "town": "Suzdal", "country_code": "RU" }
        }))
        .unwrap();

        let address = GeocodedAddress::try_from(place).unwrap();
        assert_eq!(address.city.as_deref(), Some("Suzdal"));
        assert_eq!(address.country_code.as_deref(), Some("ru"));
        assert!((address.latitude - 56.4197).abs() < 1e-9);
    }

    #[test]
    fn reverse_error_body_is_recognised() {
        let body: ReverseResponse =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert!(matches!(body, ReverseResponse::Error { .. }));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = GeocodingClient::new("https://geo.example.com/nominatim/", "test").unwrap();
        let url = client
            .endpoint("reverse", &[("lat", "1.5".into())])
            .unwrap();
        assert_eq!(url.path(), "/nominatim/reverse");
        assert_eq!(url.query(), Some("format=jsonv2&lat=1.5"));
    }

    #[test]
    fn unparseable_coordinates_are_rejected() {
        let place = NominatimPlace {
            display_name: "nowhere".into(),
            lat: "north".into(),
            lon: "0".into(),
            address: NominatimAddress::default(),
        };
        assert!(matches!(
            GeocodedAddress::try_from(place),
            Err(GeocodingError::Parse(_))
        ));
    }
}
