//! HTTP/1.1 message codec.
//!
//! This module provides:
//! - Request construction and serialization (`request`)
//! - Response status line, header and cookie parsing (`response`)
//! - Chunked and gzip body decoding (`body`)

mod body;
mod request;
mod response;

// Re-export public API
pub use body::{decode_body, decode_chunked, decode_gzip};
pub use request::{Headers, HttpRequest, Method};
pub use response::HttpResponse;
