use async_trait::async_trait;
use sysinfo::Networks;

use syspulse_core::{MetricSpec, MetricValue, Result};

use crate::probe::Probe;

#[derive(Clone, Copy)]
enum Direction {
    Rx,
    Tx,
}

/// Raw cumulative byte counter summed over all interfaces, one direction.
///
/// Reported as-is: rate conversion belongs to the consumer, not the sampler.
pub struct NetBytesProbe {
    spec: MetricSpec,
    direction: Direction,
    networks: Networks,
}

impl NetBytesProbe {
    pub fn rx() -> Self {
        Self {
            spec: MetricSpec::counter("net.rx_bytes", "bytes"),
            direction: Direction::Rx,
            networks: Networks::new_with_refreshed_list(),
        }
    }

    pub fn tx() -> Self {
        Self {
            spec: MetricSpec::counter("net.tx_bytes", "bytes"),
            direction: Direction::Tx,
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

#[async_trait]
impl Probe for NetBytesProbe {
    fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    async fn read(&mut self) -> Result<MetricValue> {
        self.networks.refresh();
        let total: u64 = self
            .networks
            .iter()
            .map(|(_, data)| match self.direction {
                Direction::Rx => data.total_received(),
                Direction::Tx => data.total_transmitted(),
            })
            .sum();
        Ok(MetricValue::Counter(total))
    }
}
