use std::time::Duration;

use serde::Deserialize;
use syspulse_core::{Result, SysPulseError};

/// All settings are static for a collector's lifetime; runtime
/// reconfiguration is out of scope.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub sampler: SamplerSection,

    #[serde(default)]
    pub buffer: BufferSection,

    #[serde(default)]
    pub hub: HubSection,

    #[serde(default)]
    pub probes: ProbeSection,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            sampler: SamplerSection::default(),
            buffer: BufferSection::default(),
            hub: HubSection::default(),
            probes: ProbeSection::default(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SysPulseError::InvalidConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.sampler.validate()?;
        self.buffer.validate()?;
        self.hub.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Per-attempt probe budget; a probe still running past this is treated
    /// as failed for the attempt.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default)]
    pub retry: RetrySection,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            retry: RetrySection::default(),
        }
    }
}

impl SamplerSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60_000).contains(&self.interval_ms) {
            return Err(SysPulseError::InvalidConfig(
                "sampler.interval_ms must be between 100 and 60000".into(),
            ));
        }
        if self.probe_timeout_ms < 10 {
            return Err(SysPulseError::InvalidConfig(
                "sampler.probe_timeout_ms must be at least 10".into(),
            ));
        }
        if self.probe_timeout_ms >= self.interval_ms {
            return Err(SysPulseError::InvalidConfig(
                "sampler.probe_timeout_ms must be less than interval_ms".into(),
            ));
        }
        self.retry.validate()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl RetrySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(SysPulseError::InvalidConfig(
                "sampler.retry.max_attempts must be between 1 and 10".into(),
            ));
        }
        if self.backoff_max_ms < self.backoff_initial_ms {
            return Err(SysPulseError::InvalidConfig(
                "sampler.retry.backoff_max_ms must be >= backoff_initial_ms".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferSection {
    /// Points retained per metric series.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for BufferSection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl BufferSection {
    pub fn validate(&self) -> Result<()> {
        if !(2..=100_000).contains(&self.capacity) {
            return Err(SysPulseError::InvalidConfig(
                "buffer.capacity must be between 2 and 100000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubSection {
    /// Batches buffered per subscription before drop-oldest kicks in.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// Consecutive failed deliveries before a subscription is torn down.
    #[serde(default = "default_max_delivery_failures")]
    pub max_delivery_failures: u32,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            queue_depth: default_queue_depth(),
            max_delivery_failures: default_max_delivery_failures(),
        }
    }
}

impl HubSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=4096).contains(&self.queue_depth) {
            return Err(SysPulseError::InvalidConfig(
                "hub.queue_depth must be between 1 and 4096".into(),
            ));
        }
        if !(1..=100).contains(&self.max_delivery_failures) {
            return Err(SysPulseError::InvalidConfig(
                "hub.max_delivery_failures must be between 1 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// Built-in probe selection. External probes are registered in code and are
/// not affected by this section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    #[serde(default = "default_true")]
    pub cpu: bool,
    #[serde(default = "default_true")]
    pub memory: bool,
    #[serde(default = "default_true")]
    pub disk: bool,
    #[serde(default = "default_true")]
    pub network: bool,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            cpu: true,
            memory: true,
            disk: true,
            network: true,
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}
fn default_probe_timeout_ms() -> u64 {
    250
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_initial_ms() -> u64 {
    50
}
fn default_backoff_max_ms() -> u64 {
    400
}
fn default_capacity() -> usize {
    300
}
fn default_queue_depth() -> usize {
    32
}
fn default_max_delivery_failures() -> u32 {
    3
}
fn default_true() -> bool {
    true
}
