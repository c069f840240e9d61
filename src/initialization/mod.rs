//! Process-wide setup.
//!
//! The TLS client carries its own `ring` provider (see `tls`), so logging is
//! the only global state to initialize.

mod logger;

pub use logger::init_logger_with;
