use std::path::{Path, PathBuf};
use std::time::Instant;

use futures_util::StreamExt;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::networking::{ByteStream, HttpFetch};
use crate::process;
use crate::release::{self, Asset};
use crate::util::{average_speed, format_bytes, format_speed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    NoReleaseInfo,
    DownloadFailed,
    Updated,
}

/// Check the release host and, if the latest tag differs from `current_version`,
/// install it and hand off to the restart command.
///
/// Resolution and download problems are logged and folded into the outcome.
///
/// # Errors
/// Returns the restart failure when the new binary is in place but the
/// restart command could not be run successfully.
pub async fn check_and_update(
    fetcher: &dyn HttpFetch,
    config: &UpdateConfig,
    current_version: &str,
) -> Result<UpdateOutcome, UpdateError> {
    let Some(latest) = release::fetch_latest_release(fetcher, config).await else {
        warn!("update: no release info obtained");
        return Ok(UpdateOutcome::NoReleaseInfo);
    };

    if is_current(&latest.tag_name, current_version) {
        info!("update: {current_version} is up to date");
        return Ok(UpdateOutcome::UpToDate);
    }

    info!(
        "update: {} available (running {current_version})",
        latest.tag_name
    );
    if !download_and_replace(fetcher, config).await {
        warn!("update: failed to download");
        return Ok(UpdateOutcome::DownloadFailed);
    }

    if config.restart.is_some() {
        process::restart(config)?;
    } else {
        info!("update: no restart command configured; new binary is used on next start");
    }
    Ok(UpdateOutcome::Updated)
}

/// Tags are opaque: `v1.0` and `1.0` are different versions.
fn is_current(latest: &str, current: &str) -> bool {
    latest == current
}

/// Download the platform asset of the latest release and move it over the
/// installed binary. Returns `true` only when the new file is in place.
///
/// The release is resolved again rather than reusing the caller's lookup.
pub async fn download_and_replace(fetcher: &dyn HttpFetch, config: &UpdateConfig) -> bool {
    match try_download_and_replace(fetcher, config).await {
        Ok(path) => {
            info!("update: applied update to {}", path.display());
            true
        }
        Err(err) => {
            warn!("update: {err}");
            false
        }
    }
}

async fn try_download_and_replace(
    fetcher: &dyn HttpFetch,
    config: &UpdateConfig,
) -> Result<PathBuf, UpdateError> {
    let latest = release::fetch_latest_release(fetcher, config)
        .await
        .ok_or(UpdateError::ReleaseUnavailable)?;

    let name = release::expected_asset_name(&config.product, &config.platform);
    let asset = latest
        .find_asset(&name)
        .ok_or_else(|| UpdateError::AssetNotFound {
            name: name.clone(),
            tag: latest.tag_name.clone(),
        })?;

    info!("update: downloading {} from {}", asset.name, latest.tag_name);
    let stream = open_download(fetcher, config, &asset.browser_download_url).await?;

    let staging = config.staging_path();
    let staged = match stage(stream, &staging).await {
        Ok(staged) => staged,
        Err(err) => {
            discard(&staging).await;
            return Err(err);
        }
    };
    if let Err(err) = verify(asset, &staged) {
        discard(&staging).await;
        return Err(err);
    }

    info!("update: apply update");
    publish(&staging, &config.binary_path()).await
}

/// GET the asset, falling back once to `proxy + url` when the direct request fails.
async fn open_download(
    fetcher: &dyn HttpFetch,
    config: &UpdateConfig,
    url: &str,
) -> Result<ByteStream, UpdateError> {
    match fetcher.fetch_stream(url).await {
        Ok(stream) => Ok(stream),
        Err(err) => {
            let Some(proxy) = config.proxy_prefix() else {
                return Err(err);
            };
            warn!("update: direct download failed ({err}); retrying through proxy");
            fetcher.fetch_stream(&format!("{proxy}{url}")).await
        }
    }
}

struct StagedFile {
    bytes: u64,
    sha256: String,
}

async fn stage(mut stream: ByteStream, dest: &Path) -> Result<StagedFile, UpdateError> {
    let io_err = |source: std::io::Error| UpdateError::StagingIo {
        path: dest.to_path_buf(),
        source,
    };

    let mut file = File::create(dest).await.map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut bytes: u64 = 0;
    let started = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(io_err)?;
        hasher.update(&chunk);
        bytes += chunk.len() as u64;
    }

    file.flush().await.map_err(io_err)?;
    file.sync_all().await.map_err(io_err)?;

    debug!(
        "update: staged {} at {} ({})",
        format_bytes(bytes),
        dest.display(),
        format_speed(average_speed(bytes, started.elapsed()))
    );
    Ok(StagedFile {
        bytes,
        sha256: format!("{:x}", hasher.finalize()),
    })
}

fn verify(asset: &Asset, staged: &StagedFile) -> Result<(), UpdateError> {
    if asset.size > 0 && staged.bytes != asset.size {
        return Err(UpdateError::SizeMismatch {
            expected: asset.size,
            actual: staged.bytes,
        });
    }
    if let Some(expected) = asset.sha256()
        && !expected.eq_ignore_ascii_case(&staged.sha256)
    {
        return Err(UpdateError::ChecksumMismatch {
            expected: expected.to_owned(),
            actual: staged.sha256.clone(),
        });
    }
    Ok(())
}

/// Rename the staged file over the binary. Both live in the same directory, so
/// the binary path always names either the old or the new file.
async fn publish(staging: &Path, binary: &Path) -> Result<PathBuf, UpdateError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|source| UpdateError::StagingIo {
                path: staging.to_path_buf(),
                source,
            })?;
    }

    fs::rename(staging, binary)
        .await
        .map_err(|source| UpdateError::ReplaceFailure {
            from: staging.to_path_buf(),
            to: binary.to_path_buf(),
            source,
        })?;
    Ok(binary.to_path_buf())
}

async fn discard(staging: &Path) {
    // Best-effort; the next run overwrites the fixed staging path anyway.
    let _ = fs::remove_file(staging).await;
}
