use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Everything that can go wrong while resolving, downloading or applying an update.
///
/// Resolution and download failures are logged and collapsed to a plain
/// outcome by the orchestrator; only the restart variants reach the caller.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("request to {url} failed: {reason}")]
    NetworkUnavailable { url: String, reason: String },

    #[error("{url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("release metadata from {url} could not be decoded: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no release information available")]
    ReleaseUnavailable,

    #[error("release {tag} has no asset named {name}")]
    AssetNotFound { name: String, tag: String },

    #[error("download from {url} failed: {reason}")]
    DownloadTransport { url: String, reason: String },

    #[error("download incomplete: received {actual} of {expected} bytes")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("failed to stage update at {}: {source}", path.display())]
    StagingIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {} onto {}: {source}", from.display(), to.display())]
    ReplaceFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no restart command configured")]
    MissingRestartCommand,

    #[error("failed to launch restart command {program}: {source}")]
    RestartLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("restart command {program} exited with {status}")]
    RestartExit { program: String, status: ExitStatus },
}

impl UpdateError {
    /// True for the restart failures that leave a staged binary waiting for an operator.
    #[must_use]
    pub fn is_restart_failure(&self) -> bool {
        matches!(
            self,
            UpdateError::MissingRestartCommand
                | UpdateError::RestartLaunch { .. }
                | UpdateError::RestartExit { .. }
        )
    }
}
