//! Collector instance: wires sampler, buffer, and hub; owns the loop task.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use syspulse_core::{MetricFilter, Result, SeriesSnapshot, SysPulseError};

use crate::buffer::SeriesBuffer;
use crate::config::CollectorConfig;
use crate::hub::{BatchReceiver, Hub, SubscriptionHandle};
use crate::probe::Probe;
use crate::sampler::Sampler;

/// One collector: exactly one buffer, one hub, one sampler.
///
/// There are no statics or ambient singletons; independent instances (e.g.
/// in tests) share nothing.
pub struct Collector {
    cfg: CollectorConfig,
    sampler: Sampler,
    buffer: Arc<SeriesBuffer>,
    hub: Arc<Hub>,
}

impl Collector {
    /// Validates the config and the probe set (non-empty, unique metric ids).
    pub fn new(cfg: CollectorConfig, probes: Vec<Box<dyn Probe>>) -> Result<Self> {
        cfg.validate()?;
        if probes.is_empty() {
            return Err(SysPulseError::InvalidConfig(
                "at least one probe must be registered".into(),
            ));
        }
        let sampler = Sampler::new(probes, &cfg.sampler);
        let buffer = Arc::new(SeriesBuffer::new(&sampler.specs(), cfg.buffer.capacity)?);
        let hub = Arc::new(Hub::new(&cfg.hub));
        Ok(Self {
            cfg,
            sampler,
            buffer,
            hub,
        })
    }

    /// Start the sampling loop on its own task and hand back the control
    /// surface used by front-ends and the supervisor.
    pub fn spawn(self) -> CollectorHandle {
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(
            self.sampler,
            Arc::clone(&self.buffer),
            Arc::clone(&self.hub),
            self.cfg.sampler.interval_ms,
            Arc::clone(&shutdown),
        ));
        CollectorHandle {
            buffer: self.buffer,
            hub: self.hub,
            shutdown,
            task,
        }
    }
}

/// Control surface of a running collector.
pub struct CollectorHandle {
    buffer: Arc<SeriesBuffer>,
    hub: Arc<Hub>,
    shutdown: Arc<Notify>,
    task: JoinHandle<Result<()>>,
}

impl CollectorHandle {
    /// Push-style consumer registration.
    pub fn subscribe(&self, filter: MetricFilter) -> (SubscriptionHandle, BatchReceiver) {
        self.hub.subscribe(filter)
    }

    /// Idempotent; safe on stale handles.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.hub.unsubscribe(handle)
    }

    /// Pull-style API for polling consumers (e.g. a web request handler).
    pub fn snapshot(&self, filter: &MetricFilter) -> Vec<SeriesSnapshot> {
        self.buffer.snapshot(filter)
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn buffer(&self) -> &SeriesBuffer {
        &self.buffer
    }

    /// Detached stop trigger, e.g. for a signal handler task.
    pub fn stopper(&self) -> CollectorStopper {
        CollectorStopper {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Request a halt without waiting for it.
    pub fn signal_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Clean, race-free halt: the loop finishes its current tick (in-flight
    /// probes complete or time out), publishes no partial batch, closes the
    /// hub, then exits.
    pub async fn shutdown(self) -> Result<()> {
        self.signal_shutdown();
        self.join().await
    }

    /// Wait for the loop to exit. A panic inside the loop (e.g. a
    /// misbehaving probe) surfaces here as the fatal
    /// [`SysPulseError::Scheduler`] so the embedding application can restart
    /// the collector.
    pub async fn join(self) -> Result<()> {
        match self.task.await {
            Ok(res) => res,
            Err(e) => Err(SysPulseError::Scheduler(format!(
                "sampler loop terminated abnormally: {e}"
            ))),
        }
    }
}

/// Stop trigger detached from the handle's lifetime.
#[derive(Clone)]
pub struct CollectorStopper {
    shutdown: Arc<Notify>,
}

impl CollectorStopper {
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}

async fn run_loop(
    mut sampler: Sampler,
    buffer: Arc<SeriesBuffer>,
    hub: Arc<Hub>,
    interval_ms: u64,
    shutdown: Arc<Notify>,
) -> Result<()> {
    let mut tick = interval(Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Nominal timestamps: wall-clock base plus seq * interval. Strictly
    // increasing by construction, independent of probe latency.
    let epoch_ms = Utc::now().timestamp_millis().max(0) as u64;
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                seq += 1;
                let timestamp_ms = seq
                    .checked_mul(interval_ms)
                    .and_then(|off| epoch_ms.checked_add(off))
                    .ok_or_else(|| {
                        SysPulseError::Scheduler("nominal clock overflowed".into())
                    })?;

                let batch = sampler.tick(seq, timestamp_ms).await;
                tracing::debug!(
                    seq,
                    samples = batch.samples.len(),
                    errors = batch.errors.len(),
                    "tick complete"
                );
                buffer.append_batch(&batch);
                hub.publish(&batch);
            }
            _ = shutdown.notified() => {
                tracing::info!("shutdown requested, stopping sampler loop");
                break;
            }
        }
    }

    hub.close();
    Ok(())
}
