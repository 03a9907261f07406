//! Integration test suite for the Vermeil shell and player.
//!
//! This crate provides integration tests that verify the components
//! work together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use bytecode;
    pub use container;
    pub use core_types;
    pub use player;
    pub use scheduler;
    pub use shell;
    pub use vm;
}
