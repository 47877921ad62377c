//! Configuration for a toolpin run.
//!
//! Three layers are merged into one immutable [`Settings`] value:
//!
//! - [`Config`]: the optional `toolpin.toml` file
//! - [`AmbientEnv`]: process environment, captured exactly once
//! - [`Overrides`]: command-line flags
//!
//! Library crates only ever see the merged [`Settings`]; nothing below the
//! CLI reads the environment on its own.

pub mod env;
pub mod model;
pub mod settings;

pub use env::AmbientEnv;
pub use model::{CacheConfig, Config, NetworkConfig, ToolConfig};
pub use settings::{Overrides, Settings};

/// File name looked up in the working directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "toolpin.toml";
