//! Top-level facade crate for syspulse.
//!
//! Re-exports the core types and the collector runtime so front-ends can
//! depend on a single crate.

pub mod core {
    pub use syspulse_core::*;
}

pub mod collector {
    pub use syspulse_collector::*;
}
