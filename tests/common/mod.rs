#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::StreamExt;
use gh_selfupdate::{ByteStream, HttpFetch, Platform, UpdateConfig, UpdateError};
use serde_json::json;

pub const API_BASE: &str = "http://api.test";
pub const OWNER: &str = "acme";
pub const PRODUCT: &str = "app";

/// Canned reply for one URL.
#[derive(Clone)]
pub enum Reply {
    Body(Vec<u8>),
    /// Request fails before any body is received.
    Unreachable,
    /// Body starts and then the connection drops.
    Broken(Vec<u8>),
}

/// In-memory `HttpFetch` that records every requested URL.
#[derive(Default)]
pub struct FakeFetcher {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, reply: Reply) -> Self {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.into(), reply);
        self
    }

    pub fn with_release(self, release: serde_json::Value) -> Self {
        self.route(latest_url(), Reply::Body(release.to_string().into_bytes()))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| *u == url).count()
    }

    /// Requests other than the metadata lookup.
    pub fn downloads(&self) -> Vec<String> {
        let latest = latest_url();
        self.requests()
            .into_iter()
            .filter(|u| *u != latest)
            .collect()
    }

    fn reply(&self, url: &str) -> Option<Reply> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(url.to_owned());
        self.routes.lock().expect("routes lock").get(url).cloned()
    }
}

#[async_trait]
impl HttpFetch for FakeFetcher {
    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, UpdateError> {
        match self.reply(url) {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Broken(_)) | Some(Reply::Unreachable) | None => {
                Err(unreachable(url))
            }
        }
    }

    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, UpdateError> {
        match self.reply(url) {
            Some(Reply::Body(body)) => {
                let chunks: Vec<Result<Vec<u8>, UpdateError>> =
                    body.chunks(3).map(|chunk| Ok(chunk.to_vec())).collect();
                Ok(futures_util::stream::iter(chunks).boxed())
            }
            Some(Reply::Broken(partial)) => {
                let chunks = vec![
                    Ok(partial),
                    Err(UpdateError::DownloadTransport {
                        url: url.to_owned(),
                        reason: "connection reset".into(),
                    }),
                ];
                Ok(futures_util::stream::iter(chunks).boxed())
            }
            Some(Reply::Unreachable) | None => Err(unreachable(url)),
        }
    }
}

fn unreachable(url: &str) -> UpdateError {
    UpdateError::NetworkUnavailable {
        url: url.to_owned(),
        reason: "connection refused".into(),
    }
}

pub fn latest_url() -> String {
    format!("{API_BASE}/repos/{OWNER}/{PRODUCT}/releases/latest")
}

pub fn linux_amd64() -> Platform {
    Platform::new("linux", "amd64")
}

pub fn config(dir: &std::path::Path) -> UpdateConfig {
    UpdateConfig::new(OWNER, PRODUCT)
        .with_api_base(API_BASE)
        .with_install_dir(dir)
        .with_platform(linux_amd64())
}

/// GitHub-shaped release payload with the given `(name, url)` assets.
pub fn release_json(tag: &str, assets: &[(&str, &str)]) -> serde_json::Value {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            json!({
                "id": i + 1,
                "name": name,
                "size": 0,
                "browser_download_url": url,
            })
        })
        .collect();
    json!({
        "id": 42,
        "html_url": format!("https://github.com/{OWNER}/{PRODUCT}/releases/tag/{tag}"),
        "name": format!("{PRODUCT} {tag}"),
        "body": "notes",
        "tag_name": tag,
        "published_at": "2024-05-01T10:20:30Z",
        "assets": assets,
    })
}
