//! DNS resolution over raw UDP.
//!
//! This module provides a stub resolver that speaks the DNS wire protocol
//! directly:
//! - Query construction and response validation (`message`)
//! - Per-family queries and the A/AAAA race (`resolution`)
//!
//! There is no caching; every lookup goes to the configured upstream server.

mod message;
mod resolution;

// Re-export public API
pub use message::{build_query, parse_response, DnsHeader, RecordType};
pub use resolution::Resolver;
