//! Restaurant Scout Library
//!
//! Looks up restaurants for a location and cuisine through the Google geocoding
//! and Yelp business search APIs. Every upstream request goes through a durable
//! cache, so repeating a query never hits the network twice.

pub mod cache;
pub mod cli;
pub mod data;
pub mod db;
pub mod fetch;
pub mod session;
pub mod stats;
