//! Domain records and upstream API adapters
//!
//! This module contains the typed records persisted to the relational store and
//! the adapters that turn raw cached payloads from the geocoding and business
//! search APIs into those records.

pub mod business;
pub mod geocode;

pub use business::{parse_businesses, BusinessSearchClient};
pub use geocode::{parse_geocode, GeocodeClient};

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while turning an upstream query into stored rows
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Fetching the payload failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// No stored location matches the coordinates a listing belongs to
    ///
    /// Means the business search ran before the location was geocoded.
    #[error("No stored location at ({latitude}, {longitude})")]
    LocationNotFound { latitude: f64, longitude: f64 },

    /// Reading or writing the relational store failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A geocoded search location, stored in the `Google` table
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
    /// Second-to-last address component of the first result
    pub state: String,
    /// Last address component of the first result
    pub country: String,
    /// The location exactly as the user typed it
    pub search_string: String,
}

/// A restaurant returned by the business search, stored in the `Yelp` table
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantListing {
    pub name: String,
    /// Title of the first category
    pub category: String,
    pub rating: f64,
    /// Price tier such as `"$$"`, empty when the business has none
    pub price: String,
    /// Display address lines joined by spaces
    pub address: String,
    /// Distance from the searched point in meters
    pub distance: f64,
}
