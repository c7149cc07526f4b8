//! Command-line interface parsing for Restaurant Scout
//!
//! This module handles parsing of CLI arguments using clap and resolves them,
//! together with the API key environment variables, into the `Settings` the
//! application starts with.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::CacheStore;
use crate::db::Database;

/// Error types for CLI argument resolution
#[derive(Debug, Error)]
pub enum CliError {
    /// No path was given and no home directory exists to derive a default from
    #[error("Cannot determine a default location for the {0}; pass it explicitly")]
    NoDataDir(&'static str),
}

/// Restaurant Scout - look up restaurants by location and cuisine
#[derive(Parser, Debug)]
#[command(name = "restaurant-scout")]
#[command(about = "Restaurant search by location and cuisine, with a persistent request cache")]
#[command(version)]
pub struct Cli {
    /// Google geocoding API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_key: String,

    /// Yelp Fusion API key, sent as a bearer token
    #[arg(long, env = "YELP_API_KEY", hide_env_values = true)]
    pub yelp_key: String,

    /// Request cache file (default: XDG cache dir)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// SQLite database file (default: XDG data dir)
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log cache hits and misses
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub google_key: String,
    pub yelp_key: String,
    pub cache_path: PathBuf,
    pub database_path: PathBuf,
    pub verbose: bool,
}

impl Settings {
    /// Creates Settings from parsed CLI arguments, filling in default paths
    ///
    /// # Returns
    /// * `Ok(Settings)` with every path resolved
    /// * `Err(CliError::NoDataDir)` if a default path is needed but unavailable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let cache_path = match &cli.cache_file {
            Some(path) => path.clone(),
            None => CacheStore::default_path().ok_or(CliError::NoDataDir("request cache"))?,
        };
        let database_path = match &cli.database {
            Some(path) => path.clone(),
            None => Database::default_path().ok_or(CliError::NoDataDir("database"))?,
        };

        Ok(Settings {
            google_key: cli.google_key.clone(),
            yelp_key: cli.yelp_key.clone(),
            cache_path,
            database_path,
            verbose: cli.verbose,
        })
    }

    /// Default tracing filter when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 5] = ["restaurant-scout", "--google-key", "g", "--yelp-key", "y"];

    #[test]
    fn test_cli_parse_keys() {
        let cli = Cli::parse_from(KEYS);
        assert_eq!(cli.google_key, "g");
        assert_eq!(cli.yelp_key, "y");
        assert!(cli.cache_file.is_none());
        assert!(cli.database.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_paths() {
        let args = KEYS
            .iter()
            .copied()
            .chain(["--cache-file", "/tmp/c.json", "--database", "/tmp/y.db", "-v"]);
        let cli = Cli::parse_from(args);

        assert_eq!(cli.cache_file, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/y.db")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_settings_from_cli_explicit_paths() {
        let args = KEYS
            .iter()
            .copied()
            .chain(["--cache-file", "c.json", "--database", "y.db"]);
        let cli = Cli::parse_from(args);

        let settings = Settings::from_cli(&cli).unwrap();

        assert_eq!(settings.cache_path, PathBuf::from("c.json"));
        assert_eq!(settings.database_path, PathBuf::from("y.db"));
        assert_eq!(settings.log_level(), "warn");
    }

    #[test]
    fn test_settings_from_cli_default_paths() {
        let cli = Cli::parse_from(KEYS);

        match Settings::from_cli(&cli) {
            Ok(settings) => {
                assert!(settings.cache_path.to_string_lossy().contains("restaurant-scout"));
                assert!(settings.database_path.ends_with("yelp.db"));
            }
            // No home directory (e.g. in CI)
            Err(err) => assert!(err.to_string().contains("default location")),
        }
    }

    #[test]
    fn test_verbose_log_level() {
        let cli = Cli::parse_from(KEYS.iter().copied().chain(["--verbose"]));
        let settings = Settings::from_cli(&cli).map(|s| s.log_level());
        if let Ok(level) = settings {
            assert_eq!(level, "debug");
        }
    }
}
