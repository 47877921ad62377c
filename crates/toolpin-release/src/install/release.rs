//! Release registry access
//!
//! Only two registry operations are needed: the most recent release, and a
//! release by exact tag. Both return the release's asset list.

use super::error::ReleaseError;
use crate::github::add_path_segments;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Release metadata from the registry API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    /// Release tag name (e.g., "v0.11.0")
    pub tag_name: String,
    /// List of downloadable assets
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Release asset (downloadable file)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Asset {
    /// Asset filename (e.g., "bruin-Linux-x86_64.tar.gz")
    pub name: String,
    /// Direct download URL
    pub browser_download_url: Url,
}

impl Release {
    /// Exact-name linear scan
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Source of release metadata for one repository
pub trait ReleaseRegistry {
    /// Most recent release (list ordered newest first, page size 1)
    fn latest_release(&self) -> Result<Release, ReleaseError>;

    /// Release carrying exactly `tag`
    fn release_by_tag(&self, tag: &str) -> Result<Release, ReleaseError>;
}

/// GitHub-compatible REST registry
pub struct GitHubRegistry {
    client: Client,
    api_base: Url,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GitHubRegistry {
    /// # Arguments
    ///
    /// * `client` - HTTP client, already configured with proxy and timeout
    /// * `api_base` - API root (`https://api.github.com` or an enterprise root)
    /// * `owner`, `repo` - repository publishing the tool
    /// * `token` - optional bearer credential
    pub fn new(
        client: Client,
        api_base: Url,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            api_base,
            owner: owner.into(),
            repo: repo.into(),
            token,
        }
    }

    /// `{api}/repos/{owner}/{repo}/releases/{extra...}`
    fn releases_url(&self, extra: &[&str]) -> Result<Url, ReleaseError> {
        let mut url = self.api_base.clone();
        let mut segments = vec!["repos", self.owner.as_str(), self.repo.as_str(), "releases"];
        segments.extend_from_slice(extra);
        add_path_segments(&mut url, &segments)?;
        Ok(url)
    }

    /// GET returning `None` on 404
    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, ReleaseError> {
        log::debug!("GET {}", url);

        let mut request = self
            .client
            .get(url.as_str())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| ReleaseError::RegistryRequest {
            url: url.clone(),
            source: e,
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ReleaseError::RegistryStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .map(Some)
            .map_err(|e| ReleaseError::RegistryRequest {
                url: url.clone(),
                source: e,
            })
    }
}

impl ReleaseRegistry for GitHubRegistry {
    fn latest_release(&self) -> Result<Release, ReleaseError> {
        let mut url = self.releases_url(&[])?;
        url.query_pairs_mut().append_pair("per_page", "1");

        let releases: Vec<Release> = self
            .get_json(&url)?
            .ok_or(ReleaseError::RegistryStatus {
                url: url.clone(),
                status: StatusCode::NOT_FOUND.as_u16(),
            })?;

        releases
            .into_iter()
            .next()
            .ok_or_else(|| ReleaseError::ReleaseNotFound {
                tag: "latest".to_string(),
            })
    }

    fn release_by_tag(&self, tag: &str) -> Result<Release, ReleaseError> {
        let url = self.releases_url(&["tags", tag])?;

        self.get_json(&url)?
            .ok_or_else(|| ReleaseError::ReleaseNotFound {
                tag: tag.to_string(),
            })
    }
}

impl fmt::Debug for GitHubRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubRegistry")
            .field("api_base", &self.api_base.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
