//! Per-tick probe execution with isolation, timeout, and bounded retry.

use tokio::time::{timeout, Duration, Instant};

use syspulse_core::{MetricSpec, MetricValue, Sample, SampleError, SysPulseError, TickBatch};

use crate::backoff::Backoff;
use crate::config::{RetrySection, SamplerSection};
use crate::probe::Probe;

/// Runs every registered probe once per tick and assembles the tick batch.
///
/// Probe faults are isolated: a probe that exhausts its retry budget
/// contributes a [`SampleError`] to the batch while its siblings still report.
/// The sampler itself never fails; anything that unwinds out of it is a
/// scheduler-level fault handled by the collector supervisor.
pub struct Sampler {
    probes: Vec<Box<dyn Probe>>,
    interval: Duration,
    probe_timeout: Duration,
    retry: RetrySection,
}

impl Sampler {
    pub fn new(probes: Vec<Box<dyn Probe>>, cfg: &SamplerSection) -> Self {
        Self {
            probes,
            interval: cfg.interval(),
            probe_timeout: cfg.probe_timeout(),
            retry: cfg.retry.clone(),
        }
    }

    /// Specs of all registered probes, in registration order.
    pub fn specs(&self) -> Vec<MetricSpec> {
        self.probes.iter().map(|p| p.spec().clone()).collect()
    }

    /// Run all probes for one tick.
    ///
    /// `timestamp_ms` is the tick's nominal timestamp; every sample and error
    /// in the returned batch carries it so consumers see one consistent
    /// cross-metric snapshot.
    pub async fn tick(&mut self, seq: u64, timestamp_ms: u64) -> TickBatch {
        let deadline = Instant::now() + self.interval;
        let mut batch = TickBatch::new(seq, timestamp_ms);

        for probe in &mut self.probes {
            let metric = probe.spec().id.clone();
            match read_with_retry(
                probe.as_mut(),
                self.probe_timeout,
                &self.retry,
                deadline,
            )
            .await
            {
                Ok(value) => batch.samples.push(Sample {
                    metric,
                    timestamp_ms,
                    value,
                }),
                Err(reason) => {
                    tracing::warn!(%metric, seq, %reason, "probe failed this tick");
                    batch.errors.push(SampleError {
                        metric,
                        timestamp_ms,
                        reason,
                    });
                }
            }
        }

        batch
    }
}

/// Bounded-attempt read: per-attempt timeout, backoff between attempts,
/// abandoned early when another attempt could not finish before `deadline`.
async fn read_with_retry(
    probe: &mut dyn Probe,
    probe_timeout: Duration,
    retry: &RetrySection,
    deadline: Instant,
) -> std::result::Result<MetricValue, String> {
    let mut backoff = Backoff::new(retry.backoff_initial_ms, retry.backoff_max_ms);
    let mut last_err = String::from("no attempts made");

    for attempt in 1..=retry.max_attempts {
        match timeout(probe_timeout, probe.read()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => last_err = e.to_string(),
            Err(_) => last_err = SysPulseError::ProbeTimeout.to_string(),
        }

        if attempt < retry.max_attempts {
            let delay = backoff.next_delay();
            if Instant::now() + delay + probe_timeout > deadline {
                tracing::debug!(attempt, "tick deadline reached, abandoning retries");
                break;
            }
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying probe");
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_err)
}
