//! wireget library: fetching URLs over hand-rolled DNS and HTTP/1.1
//!
//! Host names are resolved by sending A and AAAA queries over UDP to a single
//! upstream resolver and racing them. Requests are written to a plain TCP or
//! TLS connection by hand; responses are parsed, de-chunked and gunzipped
//! here. Redirects are followed, IPv6 failures fall back to IPv4, and large
//! resources are fetched as four parallel byte ranges.
//!
//! # Example
//!
//! ```no_run
//! use wireget::{Config, Fetcher};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(&Config::default())?;
//! let fetched = fetcher.fetch("http://example.com/").await?;
//! println!("{}", fetched.response.body_text());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod config;
pub mod dns;
mod error_handling;
mod fetch;
pub mod http;
pub mod initialization;
mod tls;
pub mod url;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use dns::{RecordType, Resolver};
pub use error_handling::{DnsProtocolError, ErrorKind, FetchError, InitializationError};
pub use fetch::{plan_segments, ranged_length, Fetched, Fetcher, Segment};
pub use http::{HttpRequest, HttpResponse, Method};
pub use url::{parse_url, Protocol, UrlComponents};
