//! Failure taxonomy for one install run
//!
//! Every failure is terminal for the run: nothing here is retried.

use crate::github::UrlError;
use thiserror::Error;
use toolpin_core::ToolpinError;
use url::Url;

#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Machine architecture outside the known set
    #[error("UNSUPPORTED_ARCHITECTURE: The \"{arch}\" architecture is not supported")]
    UnsupportedArchitecture { arch: String },

    /// Operating system outside the known set
    #[error("UNSUPPORTED_PLATFORM: The \"{os}\" platform is not supported")]
    UnsupportedPlatform { os: String },

    /// Version spec was empty
    #[error("VERSION_MISSING: a version was not provided")]
    EmptyVersion,

    /// Version cannot name a single cache directory
    #[error("INVALID_VERSION: \"{version}\" {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Asset naming template is malformed
    #[error("CONFIG_INVALID_VALUE: asset_template: {reason}")]
    InvalidTemplate { reason: String },

    /// Registry has no release for the requested tag
    #[error("RELEASE_NOT_FOUND: no release tagged \"{tag}\"")]
    ReleaseNotFound { tag: String },

    /// Release exists but carries no asset with the computed name
    #[error(
        "ASSET_NOT_FOUND: Unable to find version \"{version}\" (asset \"{asset}\") for platform \"{os}\" and architecture \"{arch}\""
    )]
    AssetNotFound {
        version: String,
        asset: String,
        os: String,
        arch: String,
    },

    /// Transport failure talking to the registry
    #[error("REGISTRY_REQUEST_FAILED: {url}: {source}")]
    RegistryRequest {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// Registry answered with an unexpected status
    #[error("REGISTRY_REQUEST_FAILED: {url} returned HTTP {status}")]
    RegistryStatus { url: Url, status: u16 },

    /// Asset download failed
    #[error("DOWNLOAD_FAILED: {url}: {source}")]
    DownloadFailed {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// Archive could not be read or unpacked
    #[error("EXTRACTION_FAILED: {archive_type}: {reason}")]
    ExtractionFailed {
        archive_type: String,
        reason: String,
    },

    /// Archive unpacked but lacks the expected structure
    #[error("EXTRACTION_FAILED: expected {expected} inside {archive}")]
    LayoutMismatch { expected: String, archive: String },

    /// Local filesystem failure
    #[error("IO_ERROR: {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// URL construction failed
    #[error("INVALID_URL: {0}")]
    Url(#[from] UrlError),

    /// HTTP client could not be built
    #[error("CLIENT_ERROR: {0}")]
    Client(#[source] reqwest::Error),
}

impl ReleaseError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }
}

impl From<ReleaseError> for ToolpinError {
    fn from(err: ReleaseError) -> Self {
        match err {
            ReleaseError::EmptyVersion => ToolpinError::VersionMissing,
            other => ToolpinError::Install(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_architecture_message() {
        let err = ReleaseError::UnsupportedArchitecture {
            arch: "riscv64".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "UNSUPPORTED_ARCHITECTURE: The \"riscv64\" architecture is not supported"
        );
    }

    #[test]
    fn test_asset_not_found_mentions_asset_name() {
        let err = ReleaseError::AssetNotFound {
            version: "v2.3.1".to_string(),
            asset: "tool_Darwin_arm64.tar.gz".to_string(),
            os: "Darwin".to_string(),
            arch: "arm64".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("ASSET_NOT_FOUND:"));
        assert!(message.contains("tool_Darwin_arm64.tar.gz"));
    }

    #[test]
    fn test_conversion_into_application_error_keeps_message() {
        let err = ReleaseError::ReleaseNotFound {
            tag: "v9.9.9".to_string(),
        };
        let app: ToolpinError = err.into();
        assert_eq!(app.to_string(), "RELEASE_NOT_FOUND: no release tagged \"v9.9.9\"");
    }

    #[test]
    fn test_empty_version_maps_to_version_missing() {
        let app: ToolpinError = ReleaseError::EmptyVersion.into();
        assert!(matches!(app, ToolpinError::VersionMissing));
    }
}
