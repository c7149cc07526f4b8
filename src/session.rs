//! Interactive query cycles
//!
//! A `Session` runs one search at a time: reset the tables, geocode the
//! location, page through the business search, then read the stored rows back
//! and aggregate them into a [`QueryReport`].

use std::fmt;
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::data::{AdapterError, BusinessSearchClient, GeocodeClient};
use crate::db::Database;
use crate::fetch::{FetchGateway, Transport};
use crate::stats::{
    distance_buckets, rating_histogram, ratings_vs_prices, top_categories, DistanceBuckets,
    RatingsVsPrices,
};

/// Input that ends the interactive loop at either prompt
pub const EXIT_SENTINEL: &str = "exit";

/// Number of categories shown in the report
const TOP_CATEGORY_LIMIT: usize = 5;

const LOCATION_PROMPT: &str = "Enter a city or town (or 'exit' to quit): ";
const TERM_PROMPT: &str = "Enter a restaurant type (or 'exit' to quit): ";

/// Errors that end a single query cycle
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Aggregates for one `(location, term)` search
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub location: String,
    pub term: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Listings returned by the search across all pages
    pub listing_count: usize,
    pub ratings_vs_prices: RatingsVsPrices,
    pub distances: DistanceBuckets,
    pub top_categories: Vec<(String, usize)>,
    pub rating_histogram: Vec<(f64, usize)>,
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\n{} \"{}\" listings near {} ({}, {})",
            self.listing_count, self.term, self.location, self.latitude, self.longitude
        )?;

        writeln!(f, "\nScatter plot counts:")?;
        for (rating, price, count) in self.ratings_vs_prices.pair_counts() {
            writeln!(f, "({:?}, '{}') appears {} times.", rating, price, count)?;
        }

        writeln!(f, "\nDistance to you:")?;
        for (band, count) in self.distances.bands() {
            writeln!(f, "  {:<10} {}", band, count)?;
        }

        writeln!(f, "\nTop categories:")?;
        for (category, count) in &self.top_categories {
            writeln!(f, "  {:<20} {}", category, count)?;
        }

        writeln!(f, "\nRatings:")?;
        for (rating, count) in &self.rating_histogram {
            writeln!(f, "  {:<4?} {}", rating, count)?;
        }
        Ok(())
    }
}

/// Owns everything one interactive user needs to run searches
#[derive(Debug)]
pub struct Session<T: Transport> {
    gateway: FetchGateway<T>,
    db: Database,
    geocode: GeocodeClient,
    search: BusinessSearchClient,
}

impl<T: Transport> Session<T> {
    pub fn new(
        gateway: FetchGateway<T>,
        db: Database,
        geocode: GeocodeClient,
        search: BusinessSearchClient,
    ) -> Self {
        Self {
            gateway,
            db,
            geocode,
            search,
        }
    }

    /// Runs one full search cycle
    ///
    /// Nothing is rolled back on failure: rows written before the failing step
    /// stay in the tables until the next cycle resets them.
    pub async fn run_query(
        &mut self,
        location: &str,
        term: &str,
    ) -> Result<QueryReport, SessionError> {
        self.db.reinit()?;

        let (latitude, longitude) = self
            .geocode
            .locate(&mut self.gateway, &self.db, location)
            .await?;
        let listings = self
            .search
            .search(&mut self.gateway, &self.db, latitude, longitude, term)
            .await?;

        let rows = self.db.rating_price_rows(location)?;
        let distances = self.db.distances(location)?;
        let categories = self.db.categories(location)?;
        let ratings = self.db.ratings(location)?;

        tracing::info!(location, term, listings = listings.len(), "query complete");

        Ok(QueryReport {
            location: location.to_string(),
            term: term.to_string(),
            latitude,
            longitude,
            listing_count: listings.len(),
            ratings_vs_prices: ratings_vs_prices(&rows),
            distances: distance_buckets(&distances),
            top_categories: top_categories(&categories, TOP_CATEGORY_LIMIT),
            rating_histogram: rating_histogram(&ratings),
        })
    }

    /// Prompts for location and term until `exit` or end of input
    ///
    /// A failed cycle is reported to `output` and the loop moves on to the
    /// next prompt. Only I/O errors on `input`/`output` end the loop early.
    pub async fn run_interactive<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> io::Result<()> {
        loop {
            let Some(location) = prompt(&mut input, &mut output, LOCATION_PROMPT)? else {
                break;
            };
            let Some(term) = prompt(&mut input, &mut output, TERM_PROMPT)? else {
                break;
            };

            match self.run_query(&location, &term).await {
                Ok(report) => write!(output, "{}", report)?,
                Err(err) => {
                    tracing::warn!(%location, %term, %err, "query failed");
                    writeln!(
                        output,
                        "Error handling data for your search: {} in {}",
                        term, location
                    )?;
                    writeln!(output, "Try again!\n")?;
                }
            }
        }
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn gateway(&self) -> &FetchGateway<T> {
        &self.gateway
    }
}

/// Reads one answer; `None` on the exit sentinel or end of input
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim_end_matches(['\r', '\n']);
    if answer == EXIT_SENTINEL {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}
