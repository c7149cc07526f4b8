//! Google geocoding adapter
//!
//! Resolves a free-text location to coordinates through the cached gateway and
//! records it in the `Google` table.

use serde_json::Value;

use super::{AdapterError, GeoLocation};
use crate::cache::Params;
use crate::db::Database;
use crate::fetch::{FetchGateway, Transport};

/// Base URL for the Google geocoding API
pub const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Client for the geocoding API
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    endpoint: String,
    api_key: String,
}

impl GeocodeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: GEOCODE_ENDPOINT.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Use a different endpoint (for testing)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Geocodes `address`, stores the location row, and returns `(lat, lng)`
    pub async fn locate<T: Transport>(
        &self,
        gateway: &mut FetchGateway<T>,
        db: &Database,
        address: &str,
    ) -> Result<(f64, f64), AdapterError> {
        let params = Params::new()
            .with("address", address)
            .with("key", &self.api_key);
        let payload = gateway.fetch(&self.endpoint, &params, &[]).await?;

        let location = parse_geocode(&payload, address)?;
        db.insert_location(&location)?;
        tracing::debug!(
            address,
            latitude = location.latitude,
            longitude = location.longitude,
            "geocoded location"
        );

        Ok((location.latitude, location.longitude))
    }
}

/// Extracts the first result of a geocoding payload
///
/// State and country are taken by position: the second-to-last and last
/// address components respectively, whatever their types say.
pub fn parse_geocode(payload: &Value, search_string: &str) -> Result<GeoLocation, AdapterError> {
    let first = payload
        .get("results")
        .and_then(|r| r.get(0))
        .ok_or_else(|| AdapterError::MissingField("results[0]".to_string()))?;

    let coords = first
        .pointer("/geometry/location")
        .ok_or_else(|| AdapterError::MissingField("geometry.location".to_string()))?;
    let latitude = coords
        .get("lat")
        .and_then(Value::as_f64)
        .ok_or_else(|| AdapterError::MissingField("geometry.location.lat".to_string()))?;
    let longitude = coords
        .get("lng")
        .and_then(Value::as_f64)
        .ok_or_else(|| AdapterError::MissingField("geometry.location.lng".to_string()))?;

    let components = first
        .get("address_components")
        .and_then(Value::as_array)
        .filter(|c| c.len() >= 2)
        .ok_or_else(|| AdapterError::MissingField("address_components".to_string()))?;
    let long_name = |component: &Value| {
        component
            .get("long_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AdapterError::MissingField("address_components.long_name".to_string()))
    };
    let state = long_name(&components[components.len() - 2])?;
    let country = long_name(&components[components.len() - 1])?;

    Ok(GeoLocation {
        latitude,
        longitude,
        state,
        country,
        search_string: search_string.to_string(),
    })
}
