//! Install orchestration
//!
//! [`Installer::install`] runs the cache → platform → resolve → fetch →
//! populate sequence and stops at the first failure. Nothing is registered in
//! the cache unless every step before population succeeded.

use crate::github::{ClientOptions, api_base_url, build_client};
use crate::install::{
    ArchiveFetcher, AssetNameTemplate, CacheKey, GitHubRegistry, MachineIdentity, PlatformKey,
    ReleaseError, ReleaseRegistry, ToolCache, VersionResolver, VersionSpec,
};
use std::path::{Path, PathBuf};
use toolpin_core::Settings;

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    /// Served from the cache without network access
    Cached(PathBuf),
    /// Downloaded, extracted and registered during this run
    Installed(PathBuf),
}

impl InstallResult {
    pub fn path(&self) -> &Path {
        match self {
            InstallResult::Cached(path) | InstallResult::Installed(path) => path,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, InstallResult::Cached(_))
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            InstallResult::Cached(path) | InstallResult::Installed(path) => path,
        }
    }
}

/// Installs one tool, one version per call
pub struct Installer<R: ReleaseRegistry = GitHubRegistry> {
    registry: R,
    fetcher: ArchiveFetcher,
    cache: ToolCache,
    tool: String,
    template: AssetNameTemplate,
    machine: MachineIdentity,
}

impl Installer<GitHubRegistry> {
    /// Wires a GitHub-backed installer from merged settings
    ///
    /// A single HTTP client (proxy and timeout already applied) is shared by
    /// the registry and the fetcher.
    ///
    /// # Errors
    ///
    /// - `InvalidTemplate` if the asset template does not parse
    /// - `Url` if the API base URL is invalid
    /// - `Client` if the HTTP client cannot be built (e.g. malformed proxy)
    pub fn from_settings(settings: &Settings) -> Result<Self, ReleaseError> {
        let template = AssetNameTemplate::parse(&settings.asset_template)?;
        let api_base = api_base_url(&settings.api_url)?;

        let client = build_client(&ClientOptions {
            proxy: settings.proxy.clone(),
            timeout: settings.timeout,
        })
        .map_err(ReleaseError::Client)?;

        let registry = GitHubRegistry::new(
            client.clone(),
            api_base,
            settings.owner.clone(),
            settings.repo.clone(),
            settings.token.clone(),
        );

        Ok(Self::new(
            registry,
            ArchiveFetcher::new(client),
            ToolCache::new(&settings.cache_dir),
            settings.tool.clone(),
            template,
        ))
    }
}

impl<R: ReleaseRegistry> Installer<R> {
    /// Installer for the running machine
    pub fn new(
        registry: R,
        fetcher: ArchiveFetcher,
        cache: ToolCache,
        tool: impl Into<String>,
        template: AssetNameTemplate,
    ) -> Self {
        Self {
            registry,
            fetcher,
            cache,
            tool: tool.into(),
            template,
            machine: MachineIdentity::current(),
        }
    }

    /// Replaces the detected machine identity
    pub fn with_machine(mut self, machine: MachineIdentity) -> Self {
        self.machine = machine;
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    /// Cache key `spec` maps to on this machine
    pub fn cache_key(&self, spec: &VersionSpec) -> CacheKey {
        CacheKey::new(&self.tool, spec.cache_version(), &self.machine.arch)
    }

    /// Returns an installation directory for `spec`
    ///
    /// # Errors
    ///
    /// Any step's error is returned unchanged; see [`ReleaseError`].
    pub fn install(&self, spec: &VersionSpec) -> Result<InstallResult, ReleaseError> {
        spec.check()?;
        let key = self.cache_key(spec);

        // 1. Cache lookup
        if let Some(path) = self.cache.lookup(&key) {
            log::info!("Found {} {} in cache at {}", self.tool, spec, path.display());
            return Ok(InstallResult::Cached(path));
        }

        // 2. Platform
        let platform = PlatformKey::from_identity(&self.machine)?;
        log::debug!("Resolved platform {} {}", platform.os, platform.arch);

        // 3. Asset URL
        log::info!("Resolving download URL for {} {}...", self.tool, spec);
        let asset = VersionResolver::new(&self.registry, &self.template).resolve_asset(
            &self.tool,
            spec,
            platform,
        )?;

        // 4. Download + extract
        log::info!("Downloading {}...", asset.browser_download_url);
        let extracted = self
            .fetcher
            .fetch(&asset.browser_download_url, &self.tool, platform.os)?;

        // 5. Register
        log::info!("Caching {} {}...", self.tool, spec);
        let path = self.cache.populate(&key, extracted.path())?;
        log::info!("Installed {} {} to {}", self.tool, spec, path.display());

        Ok(InstallResult::Installed(path))
    }
}
