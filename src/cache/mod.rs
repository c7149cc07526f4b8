//! Request cache for upstream API calls
//!
//! Every upstream response is stored under a canonical key derived from the
//! endpoint and its parameters. The cache lives in memory and is rewritten to a
//! single JSON file on every new entry, so a query answered once is never sent
//! over the network again, not even after a restart. Entries never expire.

mod key;
mod store;

pub use key::{canonical_key, Params};
pub use store::{CacheLoadError, CacheStore, StoreWriteError};
