//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_LISTEN_ADDR,
    DEFAULT_REQUEST_TIMEOUT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Parsed from the command line by the binary, or constructed programmatically
/// by library users.
///
/// # Examples
///
/// ```no_run
/// use hotel_search::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("hotels.db"),
///     seed: Some(PathBuf::from("seed.json")),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "hotel_search", version, about)]
pub struct Config {
    /// SQLite database holding geo points, rate plans, hotel metadata and profiles
    #[arg(long, env = "HOTEL_SEARCH_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// JSON seed file loaded into the database before serving
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Address the HTTP server listens on
    #[arg(long, env = "HOTEL_SEARCH_LISTEN", default_value_t = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// End-to-end deadline for one request, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    /// Lifetime of a rate cache entry in seconds (0 disables expiry)
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Maximum number of rate cache entries held in memory
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,
}

impl Config {
    /// Request deadline as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cache entry lifetime, or `None` when entries never expire.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            seed: None,
            listen: DEFAULT_LISTEN_ADDR,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
