use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolpinError};

/// Default release registry owner
pub const DEFAULT_OWNER: &str = "bruin-data";

/// Default release registry repository
pub const DEFAULT_REPO: &str = "bruin";

/// Default tool name
pub const DEFAULT_TOOL: &str = "bruin";

/// Default asset naming template (`bruin-Linux-x86_64.tar.gz`)
pub const DEFAULT_ASSET_TEMPLATE: &str = "{tool}-{os}-{arch}{ext}";

/// Default release registry API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// toolpin.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Which tool to install and where its releases live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_tool")]
    pub name: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_asset_template")]
    pub asset_template: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: default_tool(),
            owner: default_owner(),
            repo: default_repo(),
            asset_template: default_asset_template(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub proxy: Option<String>,
    /// Request timeout; requests never time out when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

fn default_repo() -> String {
    DEFAULT_REPO.to_string()
}

fn default_asset_template() -> String {
    DEFAULT_ASSET_TEMPLATE.to_string()
}

impl Config {
    /// Reads toolpin.toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToolpinError::ConfigParseError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| ToolpinError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reads `path` when given, otherwise `toolpin.toml` in `dir` if it exists,
    /// otherwise falls back to defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let candidate = dir.join(super::CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }
}
