//! Metric identity, values, samples, and per-tick batches.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable metric name, e.g. `"cpu.percent"` or `"net.rx_bytes"`.
///
/// Identity is immutable once a metric is registered with a collector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(String);

impl MetricId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Value class of a metric: floating-point gauge or integer cumulative counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Immutable description of one metric: identity, unit, value class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub id: MetricId,
    pub unit: String,
    pub kind: MetricKind,
}

impl MetricSpec {
    pub fn gauge(id: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: MetricId::new(id),
            unit: unit.into(),
            kind: MetricKind::Gauge,
        }
    }

    pub fn counter(id: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: MetricId::new(id),
            unit: unit.into(),
            kind: MetricKind::Counter,
        }
    }
}

/// A single sampled value.
///
/// Counters carry raw cumulative values; rate metrics are computed by the
/// probe itself between consecutive polls, never by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Gauge(f64),
    Counter(u64),
}

impl MetricValue {
    /// Numeric view for plotting; counters are widened lossily above 2^53.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Gauge(v) => *v,
            MetricValue::Counter(v) => *v as f64,
        }
    }
}

/// A (metric, timestamp, value) triple. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub metric: MetricId,
    /// Nominal tick timestamp, unix milliseconds.
    pub timestamp_ms: u64,
    pub value: MetricValue,
}

/// A probe failure for one metric on one tick. Diagnostics only: it never
/// enters a series, the metric simply gains no point for that timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleError {
    pub metric: MetricId,
    pub timestamp_ms: u64,
    pub reason: String,
}

/// Everything one tick produced: successful samples plus per-metric failures.
///
/// All samples in a batch share the tick's nominal timestamp, so subscribers
/// observe a consistent cross-metric snapshot per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickBatch {
    /// Monotonic tick counter, starts at 1.
    pub seq: u64,
    pub timestamp_ms: u64,
    pub samples: Vec<Sample>,
    pub errors: Vec<SampleError>,
}

impl TickBatch {
    pub fn new(seq: u64, timestamp_ms: u64) -> Self {
        Self {
            seq,
            timestamp_ms,
            samples: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.errors.is_empty()
    }

    /// Project this batch for one subscription's filter.
    pub fn filtered(&self, filter: &MetricFilter) -> TickBatch {
        match filter {
            MetricFilter::All => self.clone(),
            MetricFilter::Only(_) => TickBatch {
                seq: self.seq,
                timestamp_ms: self.timestamp_ms,
                samples: self
                    .samples
                    .iter()
                    .filter(|s| filter.matches(&s.metric))
                    .cloned()
                    .collect(),
                errors: self
                    .errors
                    .iter()
                    .filter(|e| filter.matches(&e.metric))
                    .cloned()
                    .collect(),
            },
        }
    }
}

/// Metric-id filter carried by subscriptions and snapshot requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricFilter {
    All,
    Only(HashSet<MetricId>),
}

impl MetricFilter {
    /// Convenience constructor from a list of metric names.
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MetricFilter::Only(ids.into_iter().map(|s| MetricId::new(s)).collect())
    }

    pub fn matches(&self, id: &MetricId) -> bool {
        match self {
            MetricFilter::All => true,
            MetricFilter::Only(set) => set.contains(id),
        }
    }
}
