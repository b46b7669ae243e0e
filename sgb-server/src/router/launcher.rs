//! Process launching for routed commands

use crate::error::{Result, ServerError};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Starts a command line without waiting for it
pub trait CommandLauncher: Send + Sync {
    /// Start `command_line`; returns once the process has been spawned
    fn launch(&self, command_line: &str) -> Result<()>;
}

/// Runs command lines through the platform shell
///
/// Children are reaped by a background task that logs their exit status. Must
/// be called from within a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellLauncher;

impl ShellLauncher {
    fn shell_command(command_line: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command_line);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command_line);
            cmd
        }
    }
}

impl CommandLauncher for ShellLauncher {
    fn launch(&self, command_line: &str) -> Result<()> {
        let mut child = Self::shell_command(command_line)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ServerError::Launch {
                command: command_line.to_string(),
                source,
            })?;

        let command = command_line.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!("Command {:?} exited with {}", command, status)
                }
                Ok(status) => warn!("Command {:?} exited with {}", command, status),
                Err(e) => warn!("Failed to wait for command {:?}: {}", command, e),
            }
        });

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_shell_launcher_runs_command() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran");

        ShellLauncher
            .launch(&format!("touch '{}'", marker.display()))
            .unwrap();

        for _ in 0..100 {
            if marker.exists() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("command did not run");
    }
}
