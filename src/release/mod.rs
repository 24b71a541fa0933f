use log::{debug, warn};

use crate::config::UpdateConfig;
use crate::env::Platform;
use crate::error::UpdateError;
use crate::networking::HttpFetch;

pub mod models;

pub use models::{Asset, ReleaseInfo};

/// Fetch the latest published release for `owner/product`.
///
/// Any failure (unreachable host, non-success status, undecodable body) is
/// logged here and reported as `None`; an update check must never take the
/// calling application down.
pub async fn fetch_latest_release(
    fetcher: &dyn HttpFetch,
    config: &UpdateConfig,
) -> Option<ReleaseInfo> {
    match try_fetch_latest_release(fetcher, config).await {
        Ok(release) => {
            debug!(
                "release: latest is {} with {} asset(s)",
                release.tag_name,
                release.assets.len()
            );
            Some(release)
        }
        Err(err) => {
            warn!("release: {err}");
            None
        }
    }
}

async fn try_fetch_latest_release(
    fetcher: &dyn HttpFetch,
    config: &UpdateConfig,
) -> Result<ReleaseInfo, UpdateError> {
    let url = config.latest_release_url();
    let body = fetcher.fetch_body(&url).await?;
    serde_json::from_slice(&body).map_err(|source| UpdateError::MalformedResponse { url, source })
}

/// Asset name published for a platform: `<product>_<os>_<arch>`.
pub fn expected_asset_name(product: &str, platform: &Platform) -> String {
    format!("{product}_{}_{}", platform.os, platform.arch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE_JSON: &str = r#"{
        "id": 1001,
        "html_url": "https://github.com/acme/app/releases/tag/v1.2.0",
        "name": "Harbor v1.2.0",
        "body": null,
        "tag_name": "v1.2.0",
        "published_at": "2024-05-01T10:20:30Z",
        "draft": false,
        "assets": [
            {
                "id": 1,
                "name": "app_linux_amd64",
                "size": 4,
                "browser_download_url": "https://example.com/first",
                "digest": "sha256:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
            },
            {
                "id": 2,
                "name": "app_linux_amd64",
                "size": 4,
                "browser_download_url": "https://example.com/second",
                "digest": null
            },
            {
                "id": 3,
                "name": "app_darwin_arm64",
                "size": 8,
                "browser_download_url": "https://example.com/darwin"
            }
        ]
    }"#;

    fn release() -> ReleaseInfo {
        serde_json::from_str(RELEASE_JSON).expect("release json")
    }

    #[test]
    fn decodes_github_release_payload() {
        let release = release();
        assert_eq!(release.id, 1001);
        assert_eq!(release.tag_name, "v1.2.0");
        assert_eq!(release.name, "Harbor v1.2.0");
        assert_eq!(release.body, "");
        assert_eq!(release.assets.len(), 3);
        assert_eq!(release.assets[2].size, 8);
    }

    #[test]
    fn picks_first_matching_asset_in_api_order() {
        let release = release();
        let asset = release.find_asset("app_linux_amd64").expect("asset");
        assert_eq!(asset.browser_download_url, "https://example.com/first");
        assert!(release.find_asset("app_windows_amd64").is_none());
        assert!(release.find_asset("app_linux_amd64.tar.gz").is_none());
    }

    #[test]
    fn builds_expected_asset_name() {
        assert_eq!(
            expected_asset_name("app", &Platform::new("linux", "amd64")),
            "app_linux_amd64"
        );
        assert_eq!(
            expected_asset_name("harbor", &Platform::new("darwin", "arm64")),
            "harbor_darwin_arm64"
        );
    }

    #[test]
    fn reads_sha256_digest() {
        let release = release();
        assert_eq!(
            release.assets[0].sha256(),
            Some("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")
        );
        assert_eq!(release.assets[1].sha256(), None);
        assert_eq!(release.assets[2].sha256(), None);
    }

    #[test]
    fn parses_publish_time() {
        let published = release().published().expect("timestamp");
        assert_eq!(published.to_rfc3339(), "2024-05-01T10:20:30+00:00");

        let mut undated = release();
        undated.published_at = "yesterday".into();
        assert!(undated.published().is_none());
    }

    #[test]
    fn rejects_payload_without_tag() {
        let result = serde_json::from_str::<ReleaseInfo>(r#"{"id": 1, "assets": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn tolerates_missing_assets() {
        let release: ReleaseInfo = serde_json::from_str(r#"{"tag_name": "v2"}"#).expect("json");
        assert!(release.assets.is_empty());
        assert_eq!(release.html_url, "");
    }
}
