//! HTTP client construction for registry and download requests

use reqwest::blocking::Client;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = "toolpin";

/// Network settings applied to a client
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Forward proxy for all schemes; direct connections when `None`
    pub proxy: Option<String>,

    /// Whole-request timeout; requests may block indefinitely when `None`
    pub timeout: Option<Duration>,
}

/// Builds an HTTP client from explicit options
///
/// The client never picks up proxy settings from the environment on its own:
/// either `options.proxy` is used or no proxy at all.
///
/// # Errors
///
/// Returns error if the proxy URL is invalid or the TLS backend fails to
/// initialize
pub fn build_client(options: &ClientOptions) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(options.timeout);

    let builder = match &options.proxy {
        Some(proxy) => builder.proxy(reqwest::Proxy::all(proxy)?),
        None => builder.no_proxy(),
    };

    builder.build()
}
