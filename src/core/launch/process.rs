// ─── Game Process ───
// Spawns the game as a child process.

use chrono::{DateTime, Utc};
use tokio::process::Child;
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

use super::command::LaunchCommand;

/// A freshly spawned game, before it is registered anywhere.
#[derive(Debug)]
pub struct SpawnedGame {
    pub child: Child,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

/// Start the game. Returns as soon as the OS hands back a process; the
/// caller owns output and exit monitoring. Dropping the child does not kill
/// the game.
pub fn spawn_game(command: &LaunchCommand) -> LauncherResult<SpawnedGame> {
    info!("Launching game with Java: {:?}", command.java_exe);

    let child = command
        .to_command()
        .spawn()
        .map_err(|e| LauncherError::Launch(format!("{}: {}", command.java_exe.display(), e)))?;

    let pid = child
        .id()
        .ok_or_else(|| LauncherError::Launch("process exited before reporting a pid".into()))?;

    info!("Game process started (pid {})", pid);
    Ok(SpawnedGame {
        child,
        pid,
        started_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let temp = tempfile::tempdir().unwrap();
        let command = LaunchCommand {
            java_exe: temp.path().join("no-such-java"),
            jvm_args: vec![],
            main_class: "Main".into(),
            program_args: vec![],
            working_dir: temp.path().to_path_buf(),
            natives_dir: PathBuf::from("natives"),
        };

        let err = spawn_game(&command).unwrap_err();
        assert!(matches!(err, LauncherError::Launch(_)));
        assert!(err.remediation().is_some());
    }
}
