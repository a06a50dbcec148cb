//! syspulse collector: probes, sampler loop, series buffer, and fan-out hub.
//!
//! One [`Collector`](collector::Collector) instance owns exactly one buffer
//! and one hub; there is no ambient or static state, so independent instances
//! (e.g. in tests) share nothing. Data flow per tick:
//! sampler → buffer (append) → hub (broadcast) → subscribers.

pub mod backoff;
pub mod buffer;
pub mod collector;
pub mod config;
pub mod hub;
pub mod probe;
pub mod sampler;

pub use buffer::SeriesBuffer;
pub use collector::{Collector, CollectorHandle};
pub use config::CollectorConfig;
pub use hub::{BatchReceiver, Hub, SubscriptionHandle};
pub use probe::Probe;
pub use sampler::Sampler;
