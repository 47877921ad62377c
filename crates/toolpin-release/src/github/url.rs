//! URL construction helpers for registry resources

use thiserror::Error;
use url::Url;

/// Parses the registry API root
///
/// # Arguments
///
/// * `raw` - API root such as `https://api.github.com` or an enterprise
///   `https://host/api/v3`
pub fn api_base_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(UrlError::CannotBeABase { url });
    }
    Ok(url)
}

/// Helper to safely append path segments to URL
///
/// Existing segments (an enterprise `/api/v3` prefix) are kept; each new
/// segment is percent-encoded, so `/` or `..` inside a segment cannot escape it.
///
/// # Errors
///
/// Returns error if URL cannot be a base
pub fn add_path_segments(url: &mut Url, segments: &[&str]) -> Result<(), UrlError> {
    let url_for_error = url.clone();
    url.path_segments_mut()
        .map_err(|_| UrlError::CannotBeABase { url: url_for_error })?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

/// URL construction errors
#[derive(Debug, Error)]
pub enum UrlError {
    /// URL cannot be used as a base
    #[error("URL cannot be a base: {url}")]
    CannotBeABase {
        /// The problematic URL
        url: Url,
    },

    /// Invalid URL parse error
    #[error("Invalid URL: {0}")]
    ParseError(#[from] url::ParseError),
}
