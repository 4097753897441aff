pub mod config;
pub mod db {
    pub mod models;
}
pub mod schema;
pub mod utils;
pub mod services {
    pub mod generate;
    pub mod ingest;
    pub mod metrics;
    pub mod report;
}

use crate::config::Config;
use crate::services::{generate, report};
use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{error, info};
use std::path::PathBuf;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn apply_database_migrations(conn: &mut SqliteConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            if applied.is_empty() {
                info!("Database schema is up to date; no migrations were applied");
            } else {
                let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                info!("Applied {} database migration(s): {}", applied.len(), names);
            }
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

pub fn run() -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (database_url={}, generator_seed={}, top_properties={}, report_path={})",
        cfg.database_url,
        cfg.generator_seed,
        cfg.top_properties,
        cfg.report_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    // 2) Connect DB
    let mut conn =
        SqliteConnection::establish(&cfg.database_url).map_err(|e| format!("DB connection failed: {}", e))?;
    info!("Connected to database");

    // 3) Apply pending database migrations
    apply_database_migrations(&mut conn)?;

    // 4) Generate the listing set and replace the stored table
    generate::run(&mut conn, &cfg)?;

    // 5) Derive investment metrics and publish the market report
    report::run(&mut conn, &cfg)?;

    Ok(())
}

/// Load a `.env` file from the working directory, if one exists.
/// Values already present in the process environment win.
fn load_default_env_file() -> Result<Option<PathBuf>, String> {
    let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
    let path = cwd.join(".env");
    if !path.is_file() {
        return Ok(None);
    }

    let contents =
        std::fs::read_to_string(&path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("{}:{}: missing '=' in assignment", path.display(), index + 1))?;
        let key = key.trim();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(format!(
                "{}:{}: invalid environment variable name",
                path.display(),
                index + 1
            ));
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);

        // Preserve any value that was already supplied via the process environment.
        if std::env::var_os(key).is_none() {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(Some(path))
}

fn main() {
    let loaded_env = match load_default_env_file() {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(path) = loaded_env.as_ref() {
        info!("Environment loaded from .env file: {}", path.display());
    }

    info!(
        "realty-sim {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
