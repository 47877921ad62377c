//! Shared release registry interaction utilities
//!
//! This module provides common functionality for talking to the registry:
//! - HTTP client construction with user-agent, optional proxy and timeout
//! - Safe URL construction helpers

pub mod client;
pub mod url;

// Re-exports for convenient access
pub use client::{ClientOptions, USER_AGENT, build_client};
pub use url::{UrlError, add_path_segments, api_base_url};
