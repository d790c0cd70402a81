//! Sink utilities
//!
//! - **rate_limited_logger**: keeps a failing external writer from flooding logs

pub mod rate_limited_logger;

pub use rate_limited_logger::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};
