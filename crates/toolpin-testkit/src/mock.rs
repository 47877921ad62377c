//! Release registry mocks
//!
//! Each helper registers one endpoint on a caller-owned mockito server and
//! returns the `Mock`, so tests can pin request counts with `.expect(n)`
//! before calling `.create()` themselves or assert afterwards.
//!
//! Asset download URLs point back at the same server under
//! `/download/{tag}/{name}`.

use mockito::{Matcher, Mock, Server};
use serde_json::json;

/// Path of the download endpoint for an asset
pub fn asset_path(tag: &str, name: &str) -> String {
    format!("/download/{}/{}", tag, name)
}

/// Release JSON in the registry's shape with `assets` hosted on `server_url`
pub fn release_json(server_url: &str, tag: &str, assets: &[&str]) -> serde_json::Value {
    let assets: Vec<_> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("{}{}", server_url, asset_path(tag, name)),
                "size": 0,
                "content_type": "application/octet-stream",
            })
        })
        .collect();

    json!({
        "tag_name": tag,
        "name": tag,
        "draft": false,
        "prerelease": false,
        "assets": assets,
    })
}

/// `GET /repos/{repo}/releases?per_page=1` answering with a single release
///
/// `repo` is `owner/name`. Not yet created; call `.create()`.
pub fn latest_release(server: &mut Server, repo: &str, tag: &str, assets: &[&str]) -> Mock {
    let body = json!([release_json(&server.url(), tag, assets)]);
    server
        .mock("GET", format!("/repos/{}/releases", repo).as_str())
        .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

/// `GET /repos/{repo}/releases/tags/{tag}`. Not yet created.
pub fn release_by_tag(server: &mut Server, repo: &str, tag: &str, assets: &[&str]) -> Mock {
    let body = release_json(&server.url(), tag, assets);
    server
        .mock("GET", format!("/repos/{}/releases/tags/{}", repo, tag).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

/// Tag lookup answering 404. Not yet created.
pub fn missing_tag(server: &mut Server, repo: &str, tag: &str) -> Mock {
    server
        .mock("GET", format!("/repos/{}/releases/tags/{}", repo, tag).as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Not Found"}"#)
}

/// Any request under `/repos/`; pair with `.expect(0)` to prove no registry traffic
pub fn any_registry_request(server: &mut Server) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/repos/".to_string()))
        .match_query(Matcher::Any)
}

/// Asset download endpoint serving `body`. Not yet created.
pub fn asset_download(server: &mut Server, tag: &str, name: &str, body: Vec<u8>) -> Mock {
    server
        .mock("GET", asset_path(tag, name).as_str())
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(body)
}
