//! Shared building blocks for toolpin: the application error type and the
//! configuration model that every other crate consumes.

// Core modules
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{AmbientEnv, Config, Overrides, Settings};
pub use error::{Result, ToolpinError};
