//! Minimal runtime configuration helpers.
//! Defaults produce a self-contained run against a local SQLite file.

use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "real_estate.db";
pub const DEFAULT_GENERATOR_SEED: u64 = 42;
pub const DEFAULT_TOP_PROPERTIES: NonZeroUsize = NonZeroUsize::new(5).unwrap();

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path (anything `SqliteConnection::establish` accepts).
    pub database_url: String,
    /// Seed for the listing generator; identical seeds reproduce identical tables.
    pub generator_seed: u64,
    /// How many top-ranked properties the market report keeps.
    pub top_properties: NonZeroUsize,
    /// Optional path the JSON market report is written to for the
    /// dashboard renderer. No file is written when unset.
    pub report_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let generator_seed = match std::env::var("GENERATOR_SEED") {
            Ok(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<u64>()
                .map_err(|_| "GENERATOR_SEED must be an unsigned integer".to_string())?,
            _ => DEFAULT_GENERATOR_SEED,
        };

        let top_properties = match std::env::var("TOP_PROPERTIES") {
            Ok(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| "TOP_PROPERTIES must be a positive integer".to_string())?,
            _ => DEFAULT_TOP_PROPERTIES,
        };

        let report_path = match std::env::var("REPORT_PATH") {
            Ok(s) if !s.trim().is_empty() => Some(PathBuf::from(s.trim())),
            _ => None,
        };

        Ok(Config {
            database_url,
            generator_seed,
            top_properties,
            report_path,
        })
    }
}
