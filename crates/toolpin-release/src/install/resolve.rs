//! Version spec → download URL

use super::error::ReleaseError;
use super::naming::AssetNameTemplate;
use super::platform::PlatformKey;
use super::release::{Asset, ReleaseRegistry};
use std::fmt;
use std::path::{Component, Path};

/// Prefix carried by upstream release tags (`v0.11.0`)
pub const VERSION_PREFIX: char = 'v';

/// Literal accepted for "most recent release"
pub const LATEST: &str = "latest";

/// Caller-supplied version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    Latest,
    /// Always holds a normalized tag
    Tag(String),
}

impl VersionSpec {
    /// Parses `latest` or a tag with or without the `v` prefix
    ///
    /// The tag becomes a cache directory name, so it must be one plain path
    /// component.
    pub fn parse(raw: &str) -> Result<Self, ReleaseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ReleaseError::EmptyVersion);
        }
        if raw == LATEST {
            return Ok(VersionSpec::Latest);
        }
        let spec = VersionSpec::Tag(normalize_tag(raw));
        spec.check()?;
        Ok(spec)
    }

    /// Rejects tags that would not stay inside their cache directory
    pub fn check(&self) -> Result<(), ReleaseError> {
        match self {
            VersionSpec::Latest => Ok(()),
            VersionSpec::Tag(tag) => check_tag(tag),
        }
    }

    /// Version component of the cache key
    pub fn cache_version(&self) -> &str {
        match self {
            VersionSpec::Latest => LATEST,
            VersionSpec::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_version())
    }
}

/// Ensures the release tag prefix is present
///
/// Release tags include the `v` prefix but `tool --version` prints without
/// it, so both `0.11.0` and `v0.11.0` are accepted.
pub fn normalize_tag(version: &str) -> String {
    if version.starts_with(VERSION_PREFIX) {
        version.to_string()
    } else {
        format!("{}{}", VERSION_PREFIX, version)
    }
}

fn check_tag(tag: &str) -> Result<(), ReleaseError> {
    let invalid = |reason: &str| ReleaseError::InvalidVersion {
        version: tag.to_string(),
        reason: reason.to_string(),
    };

    if tag.contains(['/', '\\']) {
        return Err(invalid("contains a path separator"));
    }
    if tag.contains("..") {
        return Err(invalid("contains '..'"));
    }
    if tag.chars().any(char::is_control) {
        return Err(invalid("contains a control character"));
    }
    let mut components = Path::new(tag).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("is not a plain directory name")),
    }
}

/// Resolves a version spec to the matching release asset
pub struct VersionResolver<'a, R: ReleaseRegistry + ?Sized> {
    registry: &'a R,
    template: &'a AssetNameTemplate,
}

impl<'a, R: ReleaseRegistry + ?Sized> VersionResolver<'a, R> {
    pub fn new(registry: &'a R, template: &'a AssetNameTemplate) -> Self {
        Self { registry, template }
    }

    /// Finds the asset for `tool` on `platform`
    ///
    /// One registry request per call; transport failures are returned as-is.
    ///
    /// # Errors
    ///
    /// - `ReleaseNotFound` if the tag does not exist (or no release exists for `latest`)
    /// - `AssetNotFound` if the release has no asset with the computed name
    pub fn resolve_asset(
        &self,
        tool: &str,
        spec: &VersionSpec,
        platform: PlatformKey,
    ) -> Result<Asset, ReleaseError> {
        let asset_name = self.template.render(tool, platform);

        let release = match spec {
            VersionSpec::Latest => self.registry.latest_release()?,
            VersionSpec::Tag(tag) => self.registry.release_by_tag(tag)?,
        };

        log::debug!(
            "Scanning {} assets of release {} for {}",
            release.assets.len(),
            release.tag_name,
            asset_name
        );

        release
            .find_asset(&asset_name)
            .cloned()
            .ok_or_else(|| ReleaseError::AssetNotFound {
                version: spec.to_string(),
                asset: asset_name,
                os: platform.os.release_id().to_string(),
                arch: platform.arch.release_id().to_string(),
            })
    }
}
