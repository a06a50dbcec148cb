//! Shared error type across syspulse crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, SysPulseError>;

/// Unified error type used by core and collector.
#[derive(Debug, Error)]
pub enum SysPulseError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("probe failed: {0}")]
    Probe(String),
    #[error("probe timed out")]
    ProbeTimeout,
    #[error("subscriber closed")]
    SubscriberClosed,
    #[error("scheduler fault: {0}")]
    Scheduler(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl SysPulseError {
    /// Whether this error terminates the collector.
    ///
    /// Probe failures, timeouts, and subscriber problems recover locally
    /// (retry, gap, drop-oldest, auto-unsubscribe). Only a sampler scheduling
    /// fault must surface to the supervising caller so the collector can be
    /// restarted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SysPulseError::Scheduler(_))
    }
}
