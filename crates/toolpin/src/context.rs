//! Global context for CLI commands

use anyhow::Result;
use std::env;
use toolpin_core::{AmbientEnv, Config, Settings, ToolpinError};
use toolpin_release::{InstallResult, Installer, VersionSpec};

use crate::cli::SourceArgs;

/// Settings merged once at startup
pub struct Context {
    pub settings: Settings,
}

impl Context {
    /// Loads the config file, snapshots the environment and applies flags
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file cannot be read or parsed
    /// - A merged value is invalid (e.g. empty tool name)
    pub fn new(source: &SourceArgs) -> Result<Self> {
        let current_dir = env::current_dir()?;
        let config = Config::discover(source.config.as_deref(), &current_dir)?;
        let settings = Settings::resolve(config, AmbientEnv::capture(), source.overrides())?;
        log::debug!("{:?}", settings);

        Ok(Self { settings })
    }

    /// Parses `version` and runs the install sequence
    pub fn install(&self, version: &str) -> Result<(VersionSpec, InstallResult)> {
        let spec = VersionSpec::parse(version).map_err(ToolpinError::from)?;
        let installer = Installer::from_settings(&self.settings).map_err(ToolpinError::from)?;
        let result = installer.install(&spec).map_err(ToolpinError::from)?;
        Ok((spec, result))
    }
}
