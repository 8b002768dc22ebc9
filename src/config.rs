//! Application configuration
//!
//! Values come from the process environment (a `.env` file is loaded first when
//! present) and fall back to defaults.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://itunes.apple.com/search";
pub const DEFAULT_INITIAL_SEARCH: &str = "Neck Deep";

#[derive(Clone, Debug)]
pub struct Config {
    /// Search endpoint; the term is sent as the `term` query parameter
    pub catalog_url: String,
    /// Term searched once at startup
    pub initial_search_term: String,
    pub request_timeout: Duration,
    /// Cadence of position sampling while a clip is playing
    pub position_poll_interval: Duration,
    /// Distance covered by one seek key press
    pub seek_step: Duration,
    pub log_dir: String,
    /// What happened while loading, logged once logging is up
    notes: Vec<LoadNote>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LoadNote {
    DotenvLoaded,
    Unparsable { key: String, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            initial_search_term: DEFAULT_INITIAL_SEARCH.to_string(),
            request_timeout: Duration::from_secs(15),
            position_poll_interval: Duration::from_millis(1000),
            seek_step: Duration::from_secs(5),
            log_dir: ".logs".to_string(),
            notes: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        // Missing .env is the normal case
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());
        if dotenv_loaded {
            config.notes.insert(0, LoadNote::DotenvLoaded);
        }
        config
    }

    /// Replay what happened during loading. Call after `init_logging`.
    pub fn log_load_notes(&self) {
        for note in &self.notes {
            match note {
                LoadNote::DotenvLoaded => tracing::debug!("Loaded .env file"),
                LoadNote::Unparsable { key, value } => {
                    tracing::warn!(key = %key, value = %value, "Ignoring unparsable config value")
                }
            }
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut notes = Vec::new();

        let catalog_url = lookup("TUNES_CATALOG_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.catalog_url);

        let initial_search_term = lookup("TUNES_INITIAL_SEARCH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.initial_search_term);

        let request_timeout = parse_or(&lookup, &mut notes, "TUNES_REQUEST_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let position_poll_interval = parse_or(&lookup, &mut notes, "TUNES_POSITION_POLL_MS")
            .filter(|ms: &u64| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.position_poll_interval);

        let seek_step = parse_or(&lookup, &mut notes, "TUNES_SEEK_STEP_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.seek_step);

        let log_dir = lookup("TUNES_LOG_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_dir);

        Self {
            catalog_url,
            initial_search_term,
            request_timeout,
            position_poll_interval,
            seek_step,
            log_dir,
            notes,
        }
    }
}

fn parse_or<F, T>(lookup: &F, notes: &mut Vec<LoadNote>, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            notes.push(LoadNote::Unparsable {
                key: key.to_string(),
                value: raw,
            });
            None
        }
    }
}
