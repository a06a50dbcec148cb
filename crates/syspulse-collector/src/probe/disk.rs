use async_trait::async_trait;
use sysinfo::Disks;

use syspulse_core::{MetricSpec, MetricValue, Result};

use crate::probe::Probe;

/// Bytes in use summed over all mounted disks.
///
/// sysinfo exposes space, not raw I/O counters, portably; a
/// platform-specific I/O probe can be registered through the same trait.
pub struct DiskUsedProbe {
    spec: MetricSpec,
    disks: Disks,
}

impl DiskUsedProbe {
    pub fn new() -> Self {
        Self {
            spec: MetricSpec::counter("disk.used_bytes", "bytes"),
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for DiskUsedProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for DiskUsedProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        self.disks.refresh();
        let used: u64 = self
            .disks
            .iter()
            .map(|d| d.total_space().saturating_sub(d.available_space()))
            .sum();
        Ok(MetricValue::Counter(used))
    }
}
