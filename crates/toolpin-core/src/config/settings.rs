use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::env::AmbientEnv;
use super::model::{Config, DEFAULT_API_URL};
use crate::error::{Result, ToolpinError};

/// Command-line overrides; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tool: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub asset_template: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

/// Fully merged, immutable settings for one run
#[derive(Clone)]
pub struct Settings {
    pub tool: String,
    pub owner: String,
    pub repo: String,
    pub asset_template: String,
    pub cache_dir: PathBuf,
    pub api_url: String,
    pub proxy: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
    pub github_path: Option<PathBuf>,
}

impl Settings {
    /// Merges the layers with precedence flag > environment > file > default
    pub fn resolve(config: Config, env: AmbientEnv, overrides: Overrides) -> Result<Self> {
        let tool = overrides.tool.unwrap_or(config.tool.name);
        if tool.trim().is_empty() {
            return Err(ToolpinError::ConfigInvalidValue {
                field: "tool.name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let cache_dir = match overrides
            .cache_dir
            .or(env.cache_dir)
            .or(env.runner_tool_cache)
            .or(config.cache.dir)
        {
            Some(dir) => dir,
            None => default_cache_dir()?,
        };

        let api_url = overrides
            .api_url
            .or(env.api_url)
            .or(config.network.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            tool,
            owner: overrides.owner.unwrap_or(config.tool.owner),
            repo: overrides.repo.unwrap_or(config.tool.repo),
            asset_template: overrides
                .asset_template
                .unwrap_or(config.tool.asset_template),
            cache_dir,
            api_url,
            proxy: env.proxy.or(config.network.proxy),
            token: overrides.token.or(env.token),
            timeout: config.network.timeout_secs.map(Duration::from_secs),
            github_path: env.github_path,
        })
    }
}

/// OS cache location: `~/.cache/toolpin` on Linux,
/// `~/Library/Caches/toolpin` on macOS, `%LOCALAPPDATA%\toolpin` on Windows
fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir()
        .ok_or_else(|| ToolpinError::Generic("Could not determine cache directory".to_string()))?;

    Ok(base.join("toolpin"))
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tool", &self.tool)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("asset_template", &self.asset_template)
            .field("cache_dir", &self.cache_dir)
            .field("api_url", &self.api_url)
            .field("proxy", &self.proxy)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("github_path", &self.github_path)
            .finish()
    }
}
