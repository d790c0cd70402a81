//! Rate-limited warning logger
//!
//! An external writer that keeps failing (disk full, revoked quota) would
//! otherwise emit one warning per queued chunk. This logger emits at most
//! one line per interval and reports how many were suppressed in between.
//!
//! # Example
//!
//! ```ignore
//! use warcpipe_sinks::util::RateLimitedLogger;
//! use std::time::Duration;
//!
//! let logger = RateLimitedLogger::new(Duration::from_secs(10));
//! for _ in 0..1000 {
//!     logger.warn("archive.warc.gz", &io_error);
//! }
//! ```

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between emitted warnings
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Warn-level logger with a minimum interval between lines
pub struct RateLimitedLogger {
    min_interval: Duration,

    /// When the last line was emitted
    last_log_time: Mutex<Option<Instant>>,

    /// Failures since the last emitted line
    pending: AtomicU64,

    /// Failures ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record a writer failure and log it unless one was logged recently
    ///
    /// Returns true if a line was emitted.
    pub fn warn(&self, sink: &str, error: &dyn Display) -> bool {
        self.pending.fetch_add(1, Ordering::Relaxed);
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;

        if !self.window_open() {
            return false;
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 1 {
            tracing::warn!(
                sink = %sink,
                error = %error,
                suppressed_count = count - 1,
                total_errors = total,
                "sink write failed (rate-limited)"
            );
        } else {
            tracing::warn!(
                sink = %sink,
                error = %error,
                total_errors = total,
                "sink write failed"
            );
        }
        true
    }

    /// Claim the log window if the interval has elapsed
    fn window_open(&self) -> bool {
        let mut last_time = self.last_log_time.lock();
        let now = Instant::now();

        match *last_time {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                *last_time = Some(now);
                true
            }
        }
    }

    /// Failures recorded since the last emitted line
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Failures ever recorded
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}
