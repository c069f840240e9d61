//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_DNS_RESOLVER, DNS_TIMEOUT_SECS, HTTP_TIMEOUT_SECS, MAX_REDIRECT_HOPS,
    RANGED_DOWNLOAD_THRESHOLD,
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

/// Fetcher configuration.
///
/// Usable programmatically through `Default` or parsed from the command line.
///
/// # Examples
///
/// ```no_run
/// use wireget::Config;
///
/// let config = Config {
///     url: "http://example.com/".to_string(),
///     resolver: "1.1.1.1:53".parse().unwrap(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "wireget", version, about = "Fetch a URL over raw DNS and HTTP/1.1")]
pub struct Config {
    /// URL to fetch (http:// or https://)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Upstream DNS resolver (IP:port) queried over UDP
    #[arg(long, default_value = DEFAULT_DNS_RESOLVER)]
    pub resolver: SocketAddr,

    /// DNS query timeout in seconds
    #[arg(long = "dns-timeout", default_value_t = DNS_TIMEOUT_SECS)]
    pub dns_timeout_secs: u64,

    /// HTTP connect and read timeout in seconds
    #[arg(long = "http-timeout", default_value_t = HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// Minimum Content-Length in bytes before switching to parallel ranged download
    #[arg(long, default_value_t = RANGED_DOWNLOAD_THRESHOLD)]
    pub range_threshold: u64,

    /// Maximum number of redirect hops to follow
    #[arg(long, default_value_t = MAX_REDIRECT_HOPS)]
    pub max_redirects: usize,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Config {
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            resolver: SocketAddr::from(([8, 8, 8, 8], 53)),
            dns_timeout_secs: DNS_TIMEOUT_SECS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            range_threshold: RANGED_DOWNLOAD_THRESHOLD,
            max_redirects: MAX_REDIRECT_HOPS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
