//! Error type definitions.
//!
//! This module defines all error types used throughout the fetcher.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::dns::RecordType;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS client configuration.
    #[error("TLS initialization error: {0}")]
    TlsError(#[from] rustls::Error),
}

/// Failures detected while validating a DNS response for one address family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsProtocolError {
    /// The transaction id of the response does not match the query.
    #[error("invalid DNS response from server: transaction id mismatch (sent {sent:#06x}, got {received:#06x})")]
    SpoofedOrMismatchedResponse { sent: u16, received: u16 },

    /// The response code nibble of the flags field was non-zero.
    #[error("server cannot resolve DNS (rcode {0})")]
    ServerResolutionFailure(u8),

    /// No answer of the requested type was present.
    #[error("the host does not have an {0} record")]
    NoSuchAddressRecord(RecordType),

    /// The response is too short to hold a header.
    #[error("malformed DNS message: {0}")]
    MalformedMessage(String),
}

/// Errors surfaced by a fetch, from URL parsing through body decoding.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("protocol {0} not implemented")]
    UnsupportedProtocol(String),

    /// Socket or timeout failure while talking to the DNS resolver.
    #[error("DNS transport error: {0}")]
    DnsTransport(String),

    #[error(transparent)]
    DnsProtocol(#[from] DnsProtocolError),

    /// Both address families failed to resolve.
    #[error("ipv4 error: {ipv4}, ipv6 error: {ipv6}")]
    AddressResolution {
        ipv4: Box<FetchError>,
        ipv6: Box<FetchError>,
    },

    /// The target has no resolved address to connect to.
    #[error("no resolved address for {0}")]
    NoAddress(String),

    /// Connect, TLS handshake, write, read or timeout failure.
    #[error("HTTP transport error: {0}")]
    HttpTransport(String),

    #[error("bad response: {0}")]
    MalformedResponse(String),

    #[error("bad response line: {0}")]
    MalformedStatusLine(String),

    #[error("bad response header: {0}")]
    MalformedHeader(String),

    #[error("bad chunked body: {0}")]
    MalformedChunkedBody(String),

    #[error("bad compressed body: {0}")]
    MalformedCompressedBody(String),

    #[error("unexpected status {actual} (expected {expected})")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("ranged download segment {index} failed: {source}")]
    RangedDownloadSegment {
        index: usize,
        #[source]
        source: Box<FetchError>,
    },

    /// I/O failure on the ranged download assembly file.
    #[error("scratch file error: {0}")]
    ScratchFile(#[from] std::io::Error),
}

/// Coarse categories of fetch errors.
///
/// Each `FetchError` maps to exactly one kind; the kind's label is the short
/// message shown to users ahead of the detailed cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    InvalidUrl,
    UnsupportedProtocol,
    DnsTransport,
    DnsProtocol,
    HttpTransport,
    MalformedResponse,
    MalformedChunkedBody,
    MalformedCompressedBody,
    UnexpectedStatus,
    TooManyRedirects,
    RangedDownloadSegment,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "Invalid URL",
            ErrorKind::UnsupportedProtocol => "Protocol not implemented",
            ErrorKind::DnsTransport => "DNS transport error",
            ErrorKind::DnsProtocol => "DNS protocol error",
            ErrorKind::HttpTransport => "HTTP transport error",
            ErrorKind::MalformedResponse => "Malformed HTTP response",
            ErrorKind::MalformedChunkedBody => "Malformed chunked body",
            ErrorKind::MalformedCompressedBody => "Malformed compressed body",
            ErrorKind::UnexpectedStatus => "Unexpected HTTP status",
            ErrorKind::TooManyRedirects => "Too many redirects",
            ErrorKind::RangedDownloadSegment => "Ranged download segment error",
        }
    }
}
