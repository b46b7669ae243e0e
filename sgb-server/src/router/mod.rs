//! Message to command routing

pub mod launcher;
pub mod table;

pub use launcher::{CommandLauncher, ShellLauncher};
pub use table::CommandTable;

use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What routing a message did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The message matched a trigger and its command was handed to the launcher
    Launched { command: String },
    /// No trigger matched; nothing ran
    NoMatch,
}

/// Maps cleaned messages to command lines from the command table file
///
/// The table is re-read on every call so edits apply without a restart.
pub struct CommandRouter {
    commands_path: PathBuf,
    launcher: Arc<dyn CommandLauncher>,
}

impl CommandRouter {
    pub fn new(commands_path: impl Into<PathBuf>, launcher: Arc<dyn CommandLauncher>) -> Self {
        Self {
            commands_path: commands_path.into(),
            launcher,
        }
    }

    /// Look `message` up and launch the mapped command, fire-and-forget
    ///
    /// Fails only when the table cannot be loaded. A failed launch is logged,
    /// not returned.
    pub fn route(&self, message: &str) -> Result<RouteOutcome> {
        let table = CommandTable::load(&self.commands_path)?;
        debug!("Loaded {} command(s)", table.len());

        let Some(command) = table.get(message) else {
            debug!("No command mapped to {:?}", message);
            return Ok(RouteOutcome::NoMatch);
        };

        info!("Running command for {:?}: {}", message, command);
        if let Err(e) = self.launcher.launch(command) {
            error!("{}", e);
        }

        Ok(RouteOutcome::Launched {
            command: command.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingLauncher {
        launched: Mutex<Vec<String>>,
    }

    impl CommandLauncher for RecordingLauncher {
        fn launch(&self, command_line: &str) -> Result<()> {
            self.launched.lock().unwrap().push(command_line.to_string());
            Ok(())
        }
    }

    fn router_with(contents: &str) -> (TempDir, CommandRouter, Arc<RecordingLauncher>) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("commands.cfg");
        fs::write(&path, contents).unwrap();
        let launcher = Arc::new(RecordingLauncher::default());
        let router = CommandRouter::new(path, launcher.clone());
        (dir, router, launcher)
    }

    #[test]
    fn test_matching_message_launches_once() {
        let (_dir, router, launcher) = router_with("restart -=> echo restart\n");

        let outcome = router.route("restart").unwrap();

        assert_eq!(
            outcome,
            RouteOutcome::Launched {
                command: "echo restart".to_string()
            }
        );
        assert_eq!(*launcher.launched.lock().unwrap(), vec!["echo restart"]);
    }

    #[test]
    fn test_unknown_message_launches_nothing() {
        let (_dir, router, launcher) = router_with("restart -=> echo restart\n");

        assert_eq!(router.route("unknown").unwrap(), RouteOutcome::NoMatch);
        assert!(launcher.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_trigger_refuses_to_route() {
        let (_dir, router, launcher) =
            router_with("restart -=> echo one\nrestart -=> echo two\n");

        let result = router.route("restart");

        assert!(matches!(result, Err(ServerError::DuplicateTrigger { .. })));
        assert!(launcher.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_table_is_reread_per_call() {
        let (dir, router, launcher) = router_with("a -=> echo a\n");
        assert_eq!(router.route("b").unwrap(), RouteOutcome::NoMatch);

        fs::write(dir.path().join("commands.cfg"), "b -=> echo b\n").unwrap();
        router.route("b").unwrap();

        assert_eq!(*launcher.launched.lock().unwrap(), vec!["echo b"]);
    }

    #[test]
    fn test_launch_failure_is_not_propagated() {
        struct FailingLauncher;
        impl CommandLauncher for FailingLauncher {
            fn launch(&self, command_line: &str) -> Result<()> {
                Err(ServerError::Launch {
                    command: command_line.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no shell"),
                })
            }
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("commands.cfg");
        fs::write(&path, "go -=> run-it\n").unwrap();
        let router = CommandRouter::new(path, Arc::new(FailingLauncher));

        assert!(router.route("go").is_ok());
    }
}
