//! Collector config loader (strict parsing).

pub mod schema;

use std::fs;

use syspulse_core::{Result, SysPulseError};

pub use schema::{
    BufferSection, CollectorConfig, HubSection, ProbeSection, RetrySection, SamplerSection,
};

pub fn load_from_file(path: &str) -> Result<CollectorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| SysPulseError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CollectorConfig> {
    let cfg: CollectorConfig = serde_yaml::from_str(s)
        .map_err(|e| SysPulseError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
