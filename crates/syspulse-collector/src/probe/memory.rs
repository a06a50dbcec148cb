use async_trait::async_trait;
use sysinfo::System;

use syspulse_core::{MetricSpec, MetricValue, Result};

use crate::probe::Probe;

/// Physical memory in use, in bytes.
pub struct MemUsedProbe {
    spec: MetricSpec,
    system: System,
}

impl MemUsedProbe {
    pub fn new() -> Self {
        Self {
            spec: MetricSpec::counter("mem.used_bytes", "bytes"),
            system: System::new(),
        }
    }
}

impl Default for MemUsedProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for MemUsedProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        self.system.refresh_memory();
        Ok(MetricValue::Counter(self.system.used_memory()))
    }
}
