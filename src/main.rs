use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use gh_selfupdate::{
    NetworkClient, RestartCommand, UpdateConfig, UpdateError, UpdateOutcome, check_and_update,
    expected_asset_name, fetch_latest_release,
};

#[derive(Parser, Debug)]
#[command(
    name = "gh-selfupdate",
    author,
    version,
    about = "Replace a binary with the latest GitHub release asset and restart it"
)]
struct Cli {
    /// Repository owner on GitHub.
    #[arg(long)]
    owner: String,

    /// Repository name; also the asset prefix and the installed file name.
    #[arg(long)]
    product: String,

    /// Version tag of the binary currently installed.
    #[arg(long, required_unless_present = "print_release")]
    current_version: Option<String>,

    /// Prefix prepended to the asset URL when the direct download fails.
    #[arg(long)]
    proxy: Option<String>,

    /// Command run after a successful update, e.g. "systemctl restart myapp".
    #[arg(long)]
    restart_cmd: Option<String>,

    /// Base URL of the releases API.
    #[arg(long, default_value = gh_selfupdate::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Directory holding the installed binary.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Connect and read timeout for HTTP requests.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Keep running and check again every N seconds.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Print the latest release and the matching asset, then exit.
    #[arg(long)]
    print_release: bool,
}

impl Cli {
    fn to_config(&self) -> UpdateConfig {
        let mut config = UpdateConfig::new(&self.owner, &self.product)
            .with_api_base(&self.api_base)
            .with_install_dir(&self.dir)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy);
        }
        if let Some(restart) = self.restart_cmd.as_deref().and_then(RestartCommand::parse) {
            config = config.with_restart(restart);
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.to_config();
    let client = NetworkClient::new(&config);

    if cli.print_release {
        return print_release(&client, &config).await;
    }

    let current = cli.current_version.as_deref().unwrap_or_default();
    let Some(secs) = cli.interval_secs else {
        return run_once(&client, &config, current).await;
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        ticker.tick().await;
        match check_and_update(&client, &config, current).await {
            Ok(UpdateOutcome::Updated) => {
                info!("update installed; exiting so the new binary can take over");
                return ExitCode::SUCCESS;
            }
            Ok(outcome) => info!("check finished: {outcome:?}"),
            Err(err) => {
                report(&err);
                return ExitCode::FAILURE;
            }
        }
    }
}

async fn run_once(client: &NetworkClient, config: &UpdateConfig, current: &str) -> ExitCode {
    match check_and_update(client, config, current).await {
        Ok(outcome) => {
            info!("check finished: {outcome:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &UpdateError) {
    if err.is_restart_failure() {
        error!("new binary is installed but the restart failed: {err}");
    } else {
        error!("{err}");
    }
}

async fn print_release(client: &NetworkClient, config: &UpdateConfig) -> ExitCode {
    let Some(release) = fetch_latest_release(client, config).await else {
        error!("no release info obtained");
        return ExitCode::FAILURE;
    };

    println!("{} ({})", release.name, release.tag_name);
    println!("{}", release.html_url);
    if let Some(published) = release.published() {
        println!("published {}", published.format("%Y-%m-%d %H:%M:%S %:z"));
    }
    for asset in &release.assets {
        println!(
            "  {} {} {}",
            asset.name,
            gh_selfupdate::util::format_bytes(asset.size),
            asset.browser_download_url
        );
    }

    let wanted = expected_asset_name(&config.product, &config.platform);
    match release.find_asset(&wanted) {
        Some(asset) => println!("asset for {}: {}", config.platform, asset.name),
        None => println!("no asset named {wanted} for {}", config.platform),
    }
    ExitCode::SUCCESS
}
