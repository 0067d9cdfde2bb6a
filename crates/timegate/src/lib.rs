//! Top-level facade crate for timegate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use timegate_core::*;
}

pub mod gateway {
    pub use timegate_gateway::*;
}
