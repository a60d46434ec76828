use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Progress of one launch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchState {
    Idle,
    Preparing,
    AccountReady,
    AssetsReady,
    Spawning,
    Running,
    Closed,
    Crashed,
}

impl LaunchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchState::Closed | LaunchState::Crashed)
    }

    /// Attempts only move forward, one stage at a time; `Running` ends in
    /// either terminal state.
    pub fn can_advance_to(self, next: LaunchState) -> bool {
        use LaunchState::*;
        matches!(
            (self, next),
            (Idle, Preparing)
                | (Preparing, AccountReady)
                | (AccountReady, AssetsReady)
                | (AssetsReady, Spawning)
                | (Spawning, Running)
                | (Running, Closed)
                | (Running, Crashed)
        )
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LaunchState::Idle => "idle",
            LaunchState::Preparing => "preparing",
            LaunchState::AccountReady => "account ready",
            LaunchState::AssetsReady => "assets ready",
            LaunchState::Spawning => "spawning",
            LaunchState::Running => "running",
            LaunchState::Closed => "closed",
            LaunchState::Crashed => "crashed",
        };
        f.write_str(label)
    }
}

/// Per-launch display preferences, carried in lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchOptions {
    pub open_game_output: bool,
    pub close_game_output: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            open_game_output: true,
            close_game_output: false,
        }
    }
}

/// Receives `(state, message)` as an attempt progresses, including the
/// final `Closed`/`Crashed` reported after the game exits.
pub type StatusCallback = Arc<dyn Fn(LaunchState, &str) + Send + Sync>;
