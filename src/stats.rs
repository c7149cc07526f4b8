//! Aggregate views over stored listings
//!
//! Pure functions that turn the rows of one search into the numbers behind the
//! ratings/prices scatter, the distance bars, the category pie and the rating
//! histogram.

use std::collections::HashMap;

/// Ratings against price levels, with a marker size per row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatingsVsPrices {
    /// Rating of each row
    pub ratings: Vec<f64>,
    /// Number of characters in each row's price tier (`"$$$"` is 3, no price is 0)
    pub price_levels: Vec<usize>,
    /// How many rows share each row's exact `(rating, price)` pair
    pub sizes: Vec<usize>,
    pairs: Vec<(f64, String, usize)>,
}

impl RatingsVsPrices {
    /// Distinct `(rating, price)` pairs with their counts, ordered by rating then price
    pub fn pair_counts(&self) -> &[(f64, String, usize)] {
        &self.pairs
    }
}

/// Builds the scatter data from `(rating, price)` rows
pub fn ratings_vs_prices(rows: &[(f64, String)]) -> RatingsVsPrices {
    let mut counts: HashMap<(u64, &str), usize> = HashMap::new();
    for (rating, price) in rows {
        *counts.entry((rating.to_bits(), price.as_str())).or_insert(0) += 1;
    }

    let ratings = rows.iter().map(|(rating, _)| *rating).collect();
    let price_levels = rows.iter().map(|(_, price)| price.chars().count()).collect();
    let sizes = rows
        .iter()
        .map(|(rating, price)| counts[&(rating.to_bits(), price.as_str())])
        .collect();

    let mut pairs: Vec<(f64, String, usize)> = counts
        .iter()
        .map(|(&(bits, price), &count)| (f64::from_bits(bits), price.to_string(), count))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    RatingsVsPrices {
        ratings,
        price_levels,
        sizes,
        pairs,
    }
}

/// Counts of distances (meters) per fixed band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistanceBuckets {
    /// Under 2500
    pub nearby: usize,
    /// 2500 up to 5000
    pub sorta: usize,
    /// 5000 up to 7500
    pub medium: usize,
    /// 7500 up to 10000
    pub pretty_far: usize,
    /// 10000 and over
    pub far: usize,
}

impl DistanceBuckets {
    /// Band names with their counts, nearest first
    pub fn bands(&self) -> [(&'static str, usize); 5] {
        [
            ("nearby", self.nearby),
            ("sorta", self.sorta),
            ("medium", self.medium),
            ("pretty_far", self.pretty_far),
            ("far", self.far),
        ]
    }

    pub fn total(&self) -> usize {
        self.nearby + self.sorta + self.medium + self.pretty_far + self.far
    }
}

pub fn distance_buckets(distances: &[f64]) -> DistanceBuckets {
    let mut buckets = DistanceBuckets::default();
    for &distance in distances {
        if distance >= 10_000.0 {
            buckets.far += 1;
        } else if distance >= 7_500.0 {
            buckets.pretty_far += 1;
        } else if distance >= 5_000.0 {
            buckets.medium += 1;
        } else if distance >= 2_500.0 {
            buckets.sorta += 1;
        } else {
            buckets.nearby += 1;
        }
    }
    buckets
}

/// The `limit` most frequent labels with their counts
///
/// Sorted by count descending; equal counts are ordered by label ascending.
pub fn top_categories<S: AsRef<str>>(labels: &[S], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label.as_ref()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Number of rows per distinct rating, lowest rating first
pub fn rating_histogram(ratings: &[f64]) -> Vec<(f64, usize)> {
    let mut sorted = ratings.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut histogram: Vec<(f64, usize)> = Vec::new();
    for rating in sorted {
        match histogram.last_mut() {
            Some((last, count)) if *last == rating => *count += 1,
            _ => histogram.push((rating, 1)),
        }
    }
    histogram
}
