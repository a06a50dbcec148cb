//! syspulse core: metric primitives, bounded series, and the shared error surface.
//!
//! This crate defines the data shapes exchanged between the sampler, the
//! series buffer, the fan-out hub, and any embedding front-end. It carries no
//! runtime or transport dependencies so it can be reused by pull-style
//! consumers (a web handler rendering a snapshot) and push-style consumers
//! (a plot widget draining a subscription) alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `SysPulseError`/`Result` so a running
//! collector never crashes on a bad sample or a misbehaving consumer.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metric;
pub mod series;

pub use error::{Result, SysPulseError};
pub use metric::{
    MetricFilter, MetricId, MetricKind, MetricSpec, MetricValue, Sample, SampleError, TickBatch,
};
pub use series::{Series, SeriesPoint, SeriesSnapshot};
