//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use restaurant_scout::fetch::{NetworkError, Transport};

pub const GEOCODE_URL: &str = "http://geocode.test/json";
pub const SEARCH_URL: &str = "http://search.test/businesses";

/// Geocoding response for "Ann Arbor"
pub const ANN_ARBOR_GEOCODE: &str = r#"{
    "results": [
        {
            "address_components": [
                {"long_name": "Ann Arbor", "short_name": "Ann Arbor", "types": ["locality", "political"]},
                {"long_name": "Washtenaw County", "short_name": "Washtenaw County", "types": ["administrative_area_level_2", "political"]},
                {"long_name": "Michigan", "short_name": "MI", "types": ["administrative_area_level_1", "political"]},
                {"long_name": "United States", "short_name": "US", "types": ["country", "political"]}
            ],
            "formatted_address": "Ann Arbor, MI, USA",
            "geometry": {"location": {"lat": 42.2808256, "lng": -83.7430378}}
        }
    ],
    "status": "OK"
}"#;

/// First page of an "Italian" search around Ann Arbor
pub const ITALIAN_PAGE: &str = r#"{
    "businesses": [
        {
            "name": "Mani Osteria",
            "categories": [{"alias": "italian", "title": "Italian"}],
            "rating": 4.0,
            "price": "$$",
            "location": {"display_address": ["341 E Liberty St", "Ann Arbor, MI 48104"]},
            "distance": 566
        },
        {
            "name": "Palio",
            "categories": [{"alias": "italian", "title": "Italian"}],
            "rating": 3.5,
            "price": "$$$",
            "location": {"display_address": ["347 S Main St", "Ann Arbor, MI 48104"]},
            "distance": 5624
        },
        {
            "name": "NYPD",
            "categories": [{"alias": "pizza", "title": "Pizza"}],
            "rating": 3.0,
            "price": "$$",
            "location": {"display_address": ["1301 S University Ave", "Ann Arbor, MI 48104"]},
            "distance": 99872
        },
        {
            "name": "Silvio's Organic Pizza",
            "categories": [{"alias": "pizza", "title": "Pizza"}],
            "rating": 4.0,
            "price": "$$",
            "location": {"display_address": ["715 N University Ave", "Ann Arbor, MI 48104"]},
            "distance": 8000
        }
    ],
    "total": 4
}"#;

pub const EMPTY_PAGE: &str = r#"{"businesses": [], "total": 4}"#;

/// Routes requests to canned bodies and records every call
#[derive(Default)]
pub struct ScriptedTransport {
    geocode: HashMap<String, String>,
    pages: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
    pub headers: RefCell<Vec<Vec<(String, String)>>>,
}

impl ScriptedTransport {
    /// Knows Ann Arbor and one page of Italian results
    pub fn ann_arbor() -> Self {
        let mut transport = Self::default();
        transport
            .geocode
            .insert("Ann Arbor".to_string(), ANN_ARBOR_GEOCODE.to_string());
        transport
            .pages
            .insert("0".to_string(), ITALIAN_PAGE.to_string());
        transport
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|(u, _)| u == url).count()
    }
}

fn param<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &[(String, String)],
    ) -> Result<String, NetworkError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), query.to_vec()));
        self.headers.borrow_mut().push(headers.to_vec());

        let not_found = || NetworkError::Status {
            url: url.to_string(),
            status: 404,
        };
        match url {
            GEOCODE_URL => param(query, "address")
                .and_then(|address| self.geocode.get(address))
                .cloned()
                .ok_or_else(not_found),
            SEARCH_URL => Ok(param(query, "offset")
                .and_then(|offset| self.pages.get(offset))
                .cloned()
                .unwrap_or_else(|| EMPTY_PAGE.to_string())),
            _ => Err(not_found()),
        }
    }
}
