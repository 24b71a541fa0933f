//! Self-update client for binaries published as GitHub release assets.
//!
//! [`check_and_update`] compares the latest release tag with the running
//! version, downloads the `<product>_<os>_<arch>` asset into a staging file,
//! renames it over the installed binary and runs the configured restart
//! command.

pub mod config;
pub mod env;
pub mod error;
pub mod networking;
pub mod process;
pub mod release;
pub mod updater;
pub mod util;

pub use config::{RestartCommand, UpdateConfig};
pub use env::Platform;
pub use error::UpdateError;
pub use networking::{ByteStream, HttpFetch, NetworkClient};
pub use process::restart;
pub use release::{Asset, ReleaseInfo, expected_asset_name, fetch_latest_release};
pub use updater::{UpdateOutcome, check_and_update, download_and_replace};
