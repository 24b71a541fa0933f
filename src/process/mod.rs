use std::process::{Command, Stdio};

use log::{error, info};

use crate::config::UpdateConfig;
use crate::error::UpdateError;

/// Hand the freshly installed binary over to the supervisor.
///
/// Runs the configured restart command to completion with its output wired to
/// ours. The supervisor owns the actual process transition; nothing is retried
/// and the current process is not replaced.
pub fn restart(config: &UpdateConfig) -> Result<(), UpdateError> {
    let command = config
        .restart
        .as_ref()
        .ok_or(UpdateError::MissingRestartCommand)?;

    info!("restart: running {command}");
    let status = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| {
            error!("restart: failed to launch {}: {source}", command.program);
            UpdateError::RestartLaunch {
                program: command.program.clone(),
                source,
            }
        })?;

    if !status.success() {
        error!("restart: {} exited with {status}", command.program);
        return Err(UpdateError::RestartExit {
            program: command.program.clone(),
            status,
        });
    }

    info!("restart: handed off to supervisor");
    Ok(())
}
