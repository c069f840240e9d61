//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, wire-format values)
//! - HTTP header name constants
//! - The `Config` struct shared by the library and the CLI

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel};
