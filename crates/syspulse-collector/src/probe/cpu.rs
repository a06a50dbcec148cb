use async_trait::async_trait;
use sysinfo::System;

use syspulse_core::{MetricSpec, MetricValue, Result};

use crate::probe::Probe;

/// Global CPU utilisation in percent.
///
/// sysinfo computes the rate between consecutive refreshes, so the value is
/// meaningful from the second poll onward; the first poll reports 0.
pub struct CpuPercentProbe {
    spec: MetricSpec,
    system: System,
}

impl CpuPercentProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self {
            spec: MetricSpec::gauge("cpu.percent", "%"),
            system,
        }
    }
}

impl Default for CpuPercentProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for CpuPercentProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        self.system.refresh_cpu_all();
        Ok(MetricValue::Gauge(self.system.global_cpu_usage() as f64))
    }
}
