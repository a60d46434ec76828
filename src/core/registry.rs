// ─── Process Registry ───
// Running games, shared between launches. Every change is announced to the
// display sink while the lock is held, so the announced list always matches
// the registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::sink::{DisplaySink, GameClosed, GameOpened};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameObject {
    pub pid: u32,
    pub game_version: String,
    #[serde(rename = "playerUUID")]
    pub player_uuid: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ProcessRegistry {
    games: Arc<Mutex<Vec<GameObject>>>,
    sink: Arc<dyn DisplaySink>,
}

impl ProcessRegistry {
    pub fn new(sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            games: Arc::new(Mutex::new(Vec::new())),
            sink,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<GameObject>> {
        self.games.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, game: GameObject, open_game_output: bool) {
        let mut games = self.lock();
        if let Some(stale) = games.iter().position(|g| g.pid == game.pid) {
            warn!("Replacing stale registry entry for pid {}", game.pid);
            games.remove(stale);
        }
        games.push(game.clone());
        debug!("Open games: {}", games.len());

        self.sink.game_opened(GameOpened {
            open_games: games.clone(),
            game,
            open_game_output,
        });
    }

    /// Remove a game. Unknown pids yield `ProcessNotFound` and change
    /// nothing, so repeated calls are harmless.
    pub fn deregister(&self, pid: u32, close_game_output: bool) -> LauncherResult<GameObject> {
        let mut games = self.lock();
        let index = games
            .iter()
            .position(|g| g.pid == pid)
            .ok_or(LauncherError::ProcessNotFound(pid))?;
        let closed_game = games.remove(index);
        debug!("Open games: {}", games.len());

        self.sink.game_closed(GameClosed {
            open_games: games.clone(),
            closed_game: closed_game.clone(),
            close_game_output,
        });
        Ok(closed_game)
    }

    /// Snapshot in registration order.
    pub fn list(&self) -> Vec<GameObject> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::GameOutput;

    #[derive(Default)]
    struct RecordingSink {
        opened: Mutex<Vec<usize>>,
        closed: Mutex<Vec<(u32, usize, bool)>>,
    }

    impl DisplaySink for RecordingSink {
        fn game_output(&self, _output: GameOutput) {}

        fn game_opened(&self, event: GameOpened) {
            self.opened.lock().unwrap().push(event.open_games.len());
        }

        fn game_closed(&self, event: GameClosed) {
            self.closed.lock().unwrap().push((
                event.closed_game.pid,
                event.open_games.len(),
                event.close_game_output,
            ));
        }
    }

    fn game(pid: u32) -> GameObject {
        GameObject {
            pid,
            game_version: "1.8.9".into(),
            player_uuid: "uuid".into(),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn register_then_deregister_restores_the_registry() {
        let sink = Arc::new(RecordingSink::default());
        let registry = ProcessRegistry::new(sink.clone());
        registry.register(game(1), true);
        let before = registry.list();

        registry.register(game(2), true);
        assert_eq!(registry.len(), 2);
        let removed = registry.deregister(2, false).unwrap();

        assert_eq!(removed.pid, 2);
        assert_eq!(registry.list(), before);
        assert_eq!(*sink.opened.lock().unwrap(), vec![1, 2]);
        assert_eq!(*sink.closed.lock().unwrap(), vec![(2, 1, false)]);
    }

    #[test]
    fn second_deregister_is_a_no_op() {
        let sink = Arc::new(RecordingSink::default());
        let registry = ProcessRegistry::new(sink.clone());
        registry.register(game(5), false);
        registry.deregister(5, true).unwrap();

        let err = registry.deregister(5, true).unwrap_err();
        assert!(matches!(err, LauncherError::ProcessNotFound(5)));
        assert!(registry.is_empty());
        assert_eq!(sink.closed.lock().unwrap().len(), 1);
    }

    #[test]
    fn game_object_uses_display_field_names() {
        let json = serde_json::to_value(game(3)).unwrap();
        assert_eq!(json["gameVersion"], "1.8.9");
        assert_eq!(json["playerUUID"], "uuid");
        assert_eq!(json["pid"], 3);
    }
}
