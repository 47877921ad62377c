//! Version-pinned release installation for toolpin.
//!
//! Given a tool name and a version spec (`latest` or a tag), this crate
//! resolves the release asset for the running machine, downloads and unpacks
//! it, and memoizes the result in a local tool cache.
//!
//! # Modules
//!
//! - [`github`]: HTTP client construction and URL helpers for the release registry
//! - [`install`]: the individual steps (platform, naming, resolution, fetch, cache)
//! - [`orchestrate`]: the cache → resolve → fetch → populate sequence
//!
//! # Install Flow
//!
//! ```text
//! Installer::install()
//!     ↓
//! 1. ToolCache::lookup(tool, version, arch)
//!     → hit: return cached path, no network
//!     ↓ (miss)
//! 2. PlatformKey::from_identity()
//!     → UnsupportedArchitecture / UnsupportedPlatform
//!     ↓
//! 3. VersionResolver::resolve_asset()
//!     → latest: GET /repos/{owner}/{repo}/releases?per_page=1
//!     → tag:    GET /repos/{owner}/{repo}/releases/tags/v{version}
//!     ↓
//! 4. ArchiveFetcher::fetch()
//!     → .tar.gz: <extract>/{tool}
//!     → otherwise: zip or single executable
//!     ↓
//! 5. ToolCache::populate()
//!     → {cache_dir}/{tool}/{version}/{arch}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use toolpin_core::{AmbientEnv, Config, Overrides, Settings};
//! use toolpin_release::{Installer, VersionSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::resolve(Config::default(), AmbientEnv::capture(), Overrides::default())?;
//! let installer = Installer::from_settings(&settings)?;
//!
//! let result = installer.install(&VersionSpec::parse("latest")?)?;
//! println!("Installed to {}", result.path().display());
//! # Ok(())
//! # }
//! ```

pub mod github;
pub mod install;
pub mod orchestrate;

pub use install::{
    ArchiveKind, Asset, AssetNameTemplate, CacheKey, GitHubRegistry, PlatformKey, Release,
    ReleaseError, ReleaseRegistry, ToolCache, VersionResolver, VersionSpec,
};
pub use orchestrate::{InstallResult, Installer};

pub type Result<T> = std::result::Result<T, ReleaseError>;
