//! Asset naming template
//!
//! Upstream release eras differ only in separator and casing
//! (`bruin-Linux-x86_64.tar.gz` vs `bruin_linux_x86_64.tar.gz`), so a single
//! template covers all of them:
//!
//! | placeholder    | value                                  |
//! |----------------|----------------------------------------|
//! | `{tool}`       | tool name                              |
//! | `{os}`         | `Linux`, `Darwin`, `Windows`           |
//! | `{os_lower}`   | `linux`, `darwin`, `windows`           |
//! | `{arch}`       | `x86_64`, `arm64`                      |
//! | `{arch_lower}` | same as `{arch}`, lower-cased          |
//! | `{ext}`        | `.zip` on Windows, `.tar.gz` otherwise |
//!
//! `{ext}` must appear exactly once and end the template, so that the
//! extension chosen here is the one [`ArchiveKind::from_url`] later sees on
//! the download URL.

use super::error::ReleaseError;
use super::platform::{Os, PlatformKey};
use std::str::FromStr;
use url::Url;

/// Underscore-separated variant (`tool_Linux_x86_64.tar.gz`)
pub const UNDERSCORE_TEMPLATE: &str = "{tool}_{os}_{arch}{ext}";

/// Archive format implied by an asset name or URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// gzip-compressed tarball
    TarGz,
    /// zip archive or a bare executable
    Zip,
}

impl ArchiveKind {
    pub const TAR_GZ_EXT: &'static str = ".tar.gz";
    pub const ZIP_EXT: &'static str = ".zip";

    /// Windows releases ship zips, everything else tarballs
    pub fn for_os(os: Os) -> Self {
        match os {
            Os::Windows => ArchiveKind::Zip,
            Os::Linux | Os::MacOS => ArchiveKind::TarGz,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::TarGz => Self::TAR_GZ_EXT,
            ArchiveKind::Zip => Self::ZIP_EXT,
        }
    }

    /// `.tar.gz` names are tarballs; anything else takes the zip path
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(Self::TAR_GZ_EXT) {
            ArchiveKind::TarGz
        } else {
            ArchiveKind::Zip
        }
    }

    /// Classifies by URL path, ignoring query string and fragment
    pub fn from_url(url: &Url) -> Self {
        Self::from_name(url.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Tool,
    Os,
    OsLower,
    Arch,
    ArchLower,
    Ext,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "tool" => Some(Field::Tool),
            "os" => Some(Field::Os),
            "os_lower" => Some(Field::OsLower),
            "arch" => Some(Field::Arch),
            "arch_lower" => Some(Field::ArchLower),
            "ext" => Some(Field::Ext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Parsed asset naming template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl AssetNameTemplate {
    pub fn parse(template: &str) -> Result<Self, ReleaseError> {
        let invalid = |reason: String| ReleaseError::InvalidTemplate { reason };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            if rest[..open].contains('}') {
                return Err(invalid(format!("stray '}}' in \"{}\"", template)));
            }
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| invalid(format!("unclosed '{{' in \"{}\"", template)))?;
            let name = &after[..close];
            let field = Field::parse(name)
                .ok_or_else(|| invalid(format!("unknown placeholder {{{}}}", name)))?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(field));
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        if literal.contains('}') {
            return Err(invalid(format!("stray '}}' in \"{}\"", template)));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let ext_count = segments
            .iter()
            .filter(|s| **s == Segment::Field(Field::Ext))
            .count();
        if ext_count != 1 {
            return Err(invalid(format!(
                "{{ext}} must appear exactly once in \"{}\"",
                template
            )));
        }
        if segments.last() != Some(&Segment::Field(Field::Ext)) {
            return Err(invalid(format!("{{ext}} must end \"{}\"", template)));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Asset name for `tool` on `platform`
    pub fn render(&self, tool: &str, platform: PlatformKey) -> String {
        let ext = ArchiveKind::for_os(platform.os).extension();

        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Field(Field::Tool) => tool.to_string(),
                Segment::Field(Field::Os) => platform.os.release_id().to_string(),
                Segment::Field(Field::OsLower) => platform.os.release_id().to_lowercase(),
                Segment::Field(Field::Arch) => platform.arch.release_id().to_string(),
                Segment::Field(Field::ArchLower) => platform.arch.release_id().to_lowercase(),
                Segment::Field(Field::Ext) => ext.to_string(),
            })
            .collect()
    }
}

impl FromStr for AssetNameTemplate {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
