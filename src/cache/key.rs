//! Canonical cache keys for upstream requests
//!
//! A key is the endpoint followed by every `name-value` parameter pair, sorted
//! by parameter name, so the same query always maps to the same key no matter
//! what order its parameters were built in.

use std::fmt::Display;

/// Separator placed between `name-value` pairs
const PAIR_SEPARATOR: &str = "_";

/// Query parameters for an upstream request
///
/// Keeps insertion order for the outgoing query string. Values are stored as
/// their `Display` rendering, which is also what goes into the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing the value in place if the name already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        let name = name.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters in insertion order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Derives the cache key for a request to `endpoint` with `params`
///
/// Empty params yield the endpoint unchanged. Request headers are never part
/// of the key.
pub fn canonical_key(endpoint: &str, params: &Params) -> String {
    let mut sorted: Vec<&(String, String)> = params.pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{}-{}", name, value))
        .collect::<Vec<_>>()
        .join(PAIR_SEPARATOR);

    format!("{}{}", endpoint, joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://api.yelp.com/v3/businesses/search";

    #[test]
    fn test_empty_params_yield_endpoint() {
        assert_eq!(canonical_key(ENDPOINT, &Params::new()), ENDPOINT);
    }

    #[test]
    fn test_pairs_sorted_by_name() {
        let params = Params::new()
            .with("term", "Italian")
            .with("latitude", 42.2808256)
            .with("offset", 50);

        assert_eq!(
            canonical_key(ENDPOINT, &params),
            format!("{}latitude-42.2808256_offset-50_term-Italian", ENDPOINT)
        );
    }

    #[test]
    fn test_insertion_order_does_not_change_key() {
        let forward = Params::new()
            .with("address", "Ann Arbor")
            .with("key", "abc123");
        let backward = Params::new()
            .with("key", "abc123")
            .with("address", "Ann Arbor");

        assert_ne!(forward.pairs(), backward.pairs());
        assert_eq!(
            canonical_key(ENDPOINT, &forward),
            canonical_key(ENDPOINT, &backward)
        );
    }

    #[test]
    fn test_all_permutations_of_three_params_agree() {
        let items = [("limit", "50"), ("offset", "100"), ("term", "Pizza")];
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        let keys: Vec<String> = orders
            .iter()
            .map(|order| {
                let mut params = Params::new();
                for &i in order {
                    params.insert(items[i].0, items[i].1);
                }
                canonical_key(ENDPOINT, &params)
            })
            .collect();

        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_distinct_values_give_distinct_keys() {
        let page_one = Params::new().with("offset", 0);
        let page_two = Params::new().with("offset", 50);

        assert_ne!(
            canonical_key(ENDPOINT, &page_one),
            canonical_key(ENDPOINT, &page_two)
        );
    }

    #[test]
    fn test_insert_replaces_existing_value_in_place() {
        let mut params = Params::new().with("term", "Thai").with("limit", 50);
        params.insert("term", "Greek");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("term"), Some("Greek"));
        assert_eq!(params.pairs()[0].0, "term");
    }
}
