use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env::Platform;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Fixed staging file name; a stale copy from an interrupted run is overwritten.
pub const STAGING_FILE: &str = "update.cache";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("gh-selfupdate/", env!("CARGO_PKG_VERSION"));

/// External command that asks the supervisor to restart the service,
/// e.g. `systemctl restart myapp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RestartCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }
}

impl fmt::Display for RestartCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Immutable settings shared by every update operation.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Repository owner on the release host.
    pub owner: String,
    /// Repository name, asset name prefix and installed file name.
    pub product: String,
    /// Prefix prepended to the asset URL for the single fallback download.
    pub proxy: Option<String>,
    pub restart: Option<RestartCommand>,
    pub api_base: String,
    /// Directory holding both the staging file and the installed binary.
    pub install_dir: PathBuf,
    pub platform: Platform,
    pub timeout: Duration,
    pub user_agent: String,
}

impl UpdateConfig {
    pub fn new(owner: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            product: product.into(),
            proxy: None,
            restart: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            install_dir: PathBuf::from("."),
            platform: Platform::current(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_restart(mut self, restart: RestartCommand) -> Self {
        self.restart = Some(restart);
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_install_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.install_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The proxy prefix, if one is configured and non-empty.
    pub fn proxy_prefix(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|proxy| !proxy.trim().is_empty())
    }

    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.product
        )
    }

    pub fn staging_path(&self) -> PathBuf {
        self.install_dir.join(STAGING_FILE)
    }

    pub fn binary_path(&self) -> PathBuf {
        self.install_dir.join(&self.product)
    }
}
