//! Application configuration and constants.
//!
//! This module provides:
//! - Search pipeline constants (radius, result caps, index resolution)
//! - Service configuration and CLI option parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
