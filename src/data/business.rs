//! Yelp business search adapter
//!
//! Pages through the business search around a geocoded point and stores every
//! returned business as a row of the `Yelp` table.

use serde_json::Value;

use super::{AdapterError, RestaurantListing};
use crate::cache::Params;
use crate::db::Database;
use crate::fetch::{FetchGateway, Transport};

/// Base URL for the Yelp business search API
pub const SEARCH_ENDPOINT: &str = "https://api.yelp.com/v3/businesses/search";

/// Results requested per page
pub const PAGE_SIZE: usize = 50;

/// Number of pages fetched per search
pub const PAGE_COUNT: usize = 3;

/// Client for the business search API
#[derive(Debug, Clone)]
pub struct BusinessSearchClient {
    endpoint: String,
    api_key: String,
}

impl BusinessSearchClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: SEARCH_ENDPOINT.to_string(),
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

    /// Query parameters for one page of results
    pub fn page_params(latitude: f64, longitude: f64, term: &str, page: usize) -> Params {
        Params::new()
            .with("latitude", latitude)
            .with("longitude", longitude)
            .with("term", term)
            .with("limit", PAGE_SIZE)
            .with("offset", PAGE_SIZE * page)
    }

    /// Searches for `term` around `(latitude, longitude)` and stores every listing
    ///
    /// # Behavior
    /// - Fetches offsets 0, 50 and 100, writing each page's rows before the next
    ///   page is requested
    /// - Every listing is linked to the stored location at exactly these
    ///   coordinates; if none exists the search fails with `LocationNotFound`
    /// - A failure part way through leaves earlier pages' rows in place
    pub async fn search<T: Transport>(
        &self,
        gateway: &mut FetchGateway<T>,
        db: &Database,
        latitude: f64,
        longitude: f64,
        term: &str,
    ) -> Result<Vec<RestaurantListing>, AdapterError> {
        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )];
        let mut listings = Vec::new();

        for page in 0..PAGE_COUNT {
            let params = Self::page_params(latitude, longitude, term, page);
            let payload = gateway.fetch(&self.endpoint, &params, &headers).await?;
            let page_listings = parse_businesses(&payload)?;

            for listing in &page_listings {
                let location_id = db
                    .location_id(latitude, longitude)?
                    .ok_or(AdapterError::LocationNotFound {
                        latitude,
                        longitude,
                    })?;
                db.insert_listing(listing, location_id)?;
            }

            tracing::debug!(page, count = page_listings.len(), "stored search page");
            listings.extend(page_listings);
        }

        Ok(listings)
    }
}

/// Extracts the listings from one page of search results
pub fn parse_businesses(payload: &Value) -> Result<Vec<RestaurantListing>, AdapterError> {
    let businesses = payload
        .get("businesses")
        .and_then(Value::as_array)
        .ok_or_else(|| AdapterError::MissingField("businesses".to_string()))?;

    businesses.iter().map(parse_business).collect()
}

fn parse_business(item: &Value) -> Result<RestaurantListing, AdapterError> {
    let missing = |field: &str| AdapterError::MissingField(field.to_string());

    let name = item
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("name"))?;
    let category = item
        .pointer("/categories/0/title")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("categories[0].title"))?;
    let rating = item
        .get("rating")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing("rating"))?;
    let price = item.get("price").and_then(Value::as_str).unwrap_or("");
    let address_lines = item
        .pointer("/location/display_address")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("location.display_address"))?;
    let distance = item
        .get("distance")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing("distance"))?;

    let address = address_lines
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(RestaurantListing {
        name: name.to_string(),
        category: category.to_string(),
        rating,
        price: price.to_string(),
        address,
        distance,
    })
}
