//! Shared helpers for collector integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;

use syspulse_collector::probe::Probe;
use syspulse_core::{MetricSpec, MetricValue, Result, SysPulseError};

/// One scripted outcome per probe attempt (not per tick: retries consume
/// entries too).
#[derive(Debug, Clone)]
pub enum Outcome {
    Value(f64),
    Fail(&'static str),
}

/// Probe that replays a fixed script of attempt outcomes, then fails.
pub struct ScriptedProbe {
    spec: MetricSpec,
    script: VecDeque<Outcome>,
}

impl ScriptedProbe {
    pub fn gauge(id: &str, script: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            spec: MetricSpec::gauge(id, "unit"),
            script: script.into_iter().collect(),
        }
    }

    /// Shorthand: one successful value per tick.
    pub fn values(id: &str, values: impl IntoIterator<Item = f64>) -> Self {
        Self::gauge(id, values.into_iter().map(Outcome::Value))
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        match self.script.pop_front() {
            Some(Outcome::Value(v)) => Ok(MetricValue::Gauge(v)),
            Some(Outcome::Fail(msg)) => Err(SysPulseError::Probe(msg.to_string())),
            None => Err(SysPulseError::Probe("script exhausted".to_string())),
        }
    }
}

/// Probe that stalls for a fixed delay before answering; used to exercise
/// the per-attempt timeout.
pub struct SlowProbe {
    spec: MetricSpec,
    delay_ms: u64,
}

impl SlowProbe {
    pub fn new(id: &str, delay_ms: u64) -> Self {
        Self {
            spec: MetricSpec::gauge(id, "unit"),
            delay_ms,
        }
    }
}

#[async_trait]
impl Probe for SlowProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        Ok(MetricValue::Gauge(0.0))
    }
}

/// Probe that panics on first read; used to exercise fatal loop termination.
pub struct PanickingProbe {
    spec: MetricSpec,
}

impl PanickingProbe {
    pub fn new(id: &str) -> Self {
        Self {
            spec: MetricSpec::gauge(id, "unit"),
        }
    }
}

#[async_trait]
impl Probe for PanickingProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        panic!("probe blew up");
    }
}

/// Config tuned for deterministic tests: no retries unless a test opts in.
pub fn test_config(capacity: usize) -> syspulse_collector::CollectorConfig {
    let yaml = format!(
        r#"
version: 1
sampler:
  interval_ms: 1000
  probe_timeout_ms: 100
  retry:
    max_attempts: 1
buffer:
  capacity: {capacity}
hub:
  queue_depth: 32
"#
    );
    syspulse_collector::config::load_from_str(&yaml).expect("test config must parse")
}
