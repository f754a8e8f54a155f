//! Route module
//!
//! Compiles declarative path specifications into matchers. Everything here is
//! pure: the same specification always compiles to the same matcher.

pub mod pattern;

// Re-export commonly used types
pub use pattern::{compile, CompiledPattern, PathSpec};
