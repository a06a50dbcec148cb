//! Metric probes.
//!
//! A probe reads exactly one host resource counter and returns a value or
//! fails. Probes are registered with a collector at construction time and
//! polled once per tick by the sampler; a probe never sees other probes'
//! results and its failure never prevents siblings from reporting.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;

use async_trait::async_trait;

use syspulse_core::{MetricSpec, MetricValue, Result};

use crate::config::ProbeSection;

/// Capability interface for one metric source.
///
/// `read` may perform blocking-ish system calls (sysinfo refreshes are cheap)
/// but must not sleep; the sampler enforces a per-attempt timeout around it.
/// `&mut self` lets stateful probes keep previous readings between polls
/// (e.g. for self-computed rates).
#[async_trait]
pub trait Probe: Send {
    /// Immutable identity of the metric this probe produces.
    fn spec(&self) -> &MetricSpec;

    /// Read the current value, or fail for this attempt.
    async fn read(&mut self) -> Result<MetricValue>;
}

/// Build the built-in host probes enabled in `cfg`.
pub fn builtin_probes(cfg: &ProbeSection) -> Vec<Box<dyn Probe>> {
    let mut probes: Vec<Box<dyn Probe>> = Vec::new();
    if cfg.cpu {
        probes.push(Box::new(cpu::CpuPercentProbe::new()));
    }
    if cfg.memory {
        probes.push(Box::new(memory::MemUsedProbe::new()));
    }
    if cfg.disk {
        probes.push(Box::new(disk::DiskUsedProbe::new()));
    }
    if cfg.network {
        probes.push(Box::new(network::NetBytesProbe::rx()));
        probes.push(Box::new(network::NetBytesProbe::tx()));
    }
    probes
}
