//! Error handling.
//!
//! This module provides:
//! - Error type definitions (`FetchError`, `DnsProtocolError`, `InitializationError`)
//! - Categorization of fetch errors into `ErrorKind`s
//!
//! Errors on one address family are recovered by the transport falling back to
//! the other family; a failed ranged download is recovered by a single-stream
//! GET. Everything else propagates to the caller of the fetch.

mod categorization;
mod types;

// Re-export public API
pub use types::{DnsProtocolError, ErrorKind, FetchError, InitializationError};
