//! Bounded ring of recent samples for one metric.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::metric::{MetricId, MetricKind, MetricValue};

/// One point in a series. The metric id lives on the series, not the point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp_ms: u64,
    pub value: MetricValue,
}

/// Fixed-capacity ring of the most recent points for one metric.
///
/// Invariants: `len() <= capacity()`, timestamps strictly increasing. When
/// full, an append evicts the oldest point. Out-of-order appends are rejected
/// without mutating the ring; the caller decides how loudly to log them.
#[derive(Debug)]
pub struct Series {
    metric: MetricId,
    capacity: usize,
    points: VecDeque<SeriesPoint>,
}

impl Series {
    /// `capacity` is clamped to at least 1.
    pub fn new(metric: MetricId, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            metric,
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn metric(&self) -> &MetricId {
        &self.metric
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_timestamp_ms(&self) -> Option<u64> {
        self.points.back().map(|p| p.timestamp_ms)
    }

    /// Append a point, evicting the oldest at capacity. O(1).
    ///
    /// Returns `false` (ring untouched) when `timestamp_ms` is not strictly
    /// greater than the last point's timestamp. This guards the single-writer
    /// pipeline against out-of-order ticks.
    pub fn append(&mut self, timestamp_ms: u64, value: MetricValue) -> bool {
        if let Some(last) = self.last_timestamp_ms() {
            if timestamp_ms <= last {
                return false;
            }
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(SeriesPoint {
            timestamp_ms,
            value,
        });
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    /// Owned copy of the current points, oldest first.
    pub fn points(&self) -> Vec<SeriesPoint> {
        self.points.iter().copied().collect()
    }
}

/// Immutable copy of one series as of the snapshot instant.
///
/// Consumers only ever receive these; references into the live ring never
/// escape the buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub metric: MetricId,
    pub unit: String,
    pub kind: MetricKind,
    pub points: Vec<SeriesPoint>,
}
