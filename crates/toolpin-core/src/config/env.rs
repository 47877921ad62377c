//! Process environment snapshot
//!
//! The environment is read once at startup and then treated as immutable,
//! process-wide configuration. Lookups go through a closure so tests can feed
//! a fixed map instead of mutating the real environment.

use std::fmt;
use std::path::PathBuf;

/// Environment values relevant to an install run
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AmbientEnv {
    /// Forward proxy URL (`http_proxy` style)
    pub proxy: Option<String>,
    /// Bearer credential for the release registry
    pub token: Option<String>,
    /// Registry API root override
    pub api_url: Option<String>,
    /// Explicit cache root
    pub cache_dir: Option<PathBuf>,
    /// Cache root provided by a CI runner
    pub runner_tool_cache: Option<PathBuf>,
    /// File that the automation host reads to extend PATH for later steps
    pub github_path: Option<PathBuf>,
}

impl AmbientEnv {
    /// Snapshot of the real process environment
    pub fn capture() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the snapshot from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| case_insensitive(&lookup, name);

        Self {
            proxy: get("http_proxy").or_else(|| get("https_proxy")),
            token: get("GITHUB_TOKEN"),
            api_url: get("GITHUB_API_URL"),
            cache_dir: get("TOOLPIN_CACHE_DIR").map(PathBuf::from),
            runner_tool_cache: get("RUNNER_TOOL_CACHE").map(PathBuf::from),
            github_path: get("GITHUB_PATH").map(PathBuf::from),
        }
    }
}

/// Prefers the lowercase spelling of a variable, then the uppercase one.
/// Empty values count as unset.
fn case_insensitive<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(&name.to_lowercase())
        .filter(|v| !v.is_empty())
        .or_else(|| lookup(&name.to_uppercase()).filter(|v| !v.is_empty()))
}

impl fmt::Debug for AmbientEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientEnv")
            .field("proxy", &self.proxy)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("cache_dir", &self.cache_dir)
            .field("runner_tool_cache", &self.runner_tool_cache)
            .field("github_path", &self.github_path)
            .finish()
    }
}
