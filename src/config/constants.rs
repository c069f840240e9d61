//! Configuration constants.
//!
//! This module defines the constants used throughout the fetcher, including
//! timeouts, size thresholds and DNS wire-format values.

// DNS resolution
/// Upstream stub resolver used when none is configured.
pub const DEFAULT_DNS_RESOLVER: &str = "8.8.8.8:53";
/// DNS query timeout in seconds, applied to the whole UDP exchange.
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// Receive buffer for a single DNS response datagram.
pub const DNS_RESPONSE_BUFFER_SIZE: usize = 1024;
/// DNS class IN.
pub const DNS_CLASS_IN: u16 = 1;
/// Recursion-desired bit of the DNS header flags.
pub const DNS_FLAG_RECURSION_DESIRED: u16 = 1 << 8;
/// Size of the fixed DNS message header.
pub const DNS_HEADER_LEN: usize = 12;

// HTTP transport
/// TCP connect (and TLS handshake) timeout in seconds.
/// The same value bounds the write + read phase of each exchange.
pub const HTTP_TIMEOUT_SECS: u64 = 5;
pub const HTTP_DEFAULT_PORT: u16 = 80;
pub const HTTPS_DEFAULT_PORT: u16 = 443;

// Redirect handling
/// Maximum number of redirect hops to follow
/// Prevents infinite redirect loops and excessive request chains
pub const MAX_REDIRECT_HOPS: usize = 10;

// Ranged downloads
/// Minimum advertised Content-Length (10 MiB) before a download is split into
/// parallel byte-range fetches.
pub const RANGED_DOWNLOAD_THRESHOLD: u64 = 10 * 1024 * 1024;
/// Number of parallel segment fetches per ranged download.
pub const RANGED_DOWNLOAD_SEGMENTS: u64 = 4;

