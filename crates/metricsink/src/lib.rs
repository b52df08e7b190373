//! Top-level facade crate for metricsink.
//!
//! Re-exports the core primitives and the gateway library so users can depend on a single crate.

pub mod core {
    pub use metricsink_core::*;
}

pub mod gateway {
    pub use metricsink_gateway::*;
}
