//! Time-series buffer: one bounded ring per registered metric.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use syspulse_core::{
    MetricFilter, MetricId, MetricSpec, Result, Series, SeriesSnapshot, SysPulseError, TickBatch,
};

#[derive(Debug)]
struct Slot {
    spec: MetricSpec,
    ring: RwLock<Series>,
}

/// Holds the most recent N samples per metric.
///
/// The metric set is frozen at construction (a collector's config is static
/// for its lifetime), so the map itself is never mutated: only the per-series
/// rings are, each behind its own lock. Writes come from a single writer (the
/// sampler loop); snapshots may run concurrently from any thread and never
/// observe a partially written sample because the write lock spans exactly
/// one O(1) append.
#[derive(Debug)]
pub struct SeriesBuffer {
    slots: HashMap<MetricId, Slot>,
    /// Registration order, for deterministic snapshot output.
    order: Vec<MetricId>,
    rejected: AtomicU64,
}

impl SeriesBuffer {
    /// Fails on duplicate metric ids.
    pub fn new(specs: &[MetricSpec], capacity: usize) -> Result<Self> {
        let mut slots = HashMap::with_capacity(specs.len());
        let mut order = Vec::with_capacity(specs.len());
        for spec in specs {
            if slots.contains_key(&spec.id) {
                return Err(SysPulseError::DuplicateMetric(spec.id.to_string()));
            }
            order.push(spec.id.clone());
            slots.insert(
                spec.id.clone(),
                Slot {
                    spec: spec.clone(),
                    ring: RwLock::new(Series::new(spec.id.clone(), capacity)),
                },
            );
        }
        Ok(Self {
            slots,
            order,
            rejected: AtomicU64::new(0),
        })
    }

    pub fn metrics(&self) -> &[MetricId] {
        &self.order
    }

    /// Append every sample of a tick batch to its series.
    ///
    /// Sole caller in the pipeline is the sampler loop. A sample whose
    /// timestamp is not strictly greater than its series' last timestamp is
    /// rejected, logged, and counted; it never crashes the pipeline. Samples
    /// for unregistered metrics are likewise logged and skipped.
    pub fn append_batch(&self, batch: &TickBatch) {
        for sample in &batch.samples {
            let Some(slot) = self.slots.get(&sample.metric) else {
                tracing::warn!(metric = %sample.metric, "sample for unregistered metric dropped");
                self.rejected.fetch_add(1, Ordering::Relaxed);
                continue;
            };
            let appended = slot.ring.write().append(sample.timestamp_ms, sample.value);
            if !appended {
                tracing::warn!(
                    metric = %sample.metric,
                    timestamp_ms = sample.timestamp_ms,
                    "out-of-order sample rejected"
                );
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Immutable copies of the requested series as of the call instant.
    ///
    /// May run concurrently with appends; each series is read-locked only for
    /// the duration of its copy, so the writer is never blocked for long.
    pub fn snapshot(&self, filter: &MetricFilter) -> Vec<SeriesSnapshot> {
        self.order
            .iter()
            .filter(|id| filter.matches(id))
            .filter_map(|id| self.slots.get(id))
            .map(|slot| SeriesSnapshot {
                metric: slot.spec.id.clone(),
                unit: slot.spec.unit.clone(),
                kind: slot.spec.kind,
                points: slot.ring.read().points(),
            })
            .collect()
    }

    /// Count of samples refused at the buffer boundary (out-of-order or
    /// unregistered). Diagnostics only.
    pub fn rejected_appends(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}
