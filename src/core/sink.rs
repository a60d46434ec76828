// ─── Display sink ───
// Boundary to whatever shows game output and running games (a window, a
// terminal, an IPC bridge). The launcher only pushes events through it.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::logs::LogRecord;
use crate::core::registry::GameObject;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutput {
    pub record: LogRecord,
    pub pid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOpened {
    pub open_games: Vec<GameObject>,
    pub game: GameObject,
    pub open_game_output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameClosed {
    pub open_games: Vec<GameObject>,
    pub closed_game: GameObject,
    pub close_game_output: bool,
}

/// Receives lifecycle and output events. Implementations must not block:
/// they are called from output pumps and while the registry lock is held.
pub trait DisplaySink: Send + Sync {
    fn game_output(&self, output: GameOutput);
    fn game_opened(&self, event: GameOpened);
    fn game_closed(&self, event: GameClosed);
}

/// Events as they cross an IPC boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", content = "payload")]
pub enum DisplayEvent {
    #[serde(rename = "game-output-data")]
    Output(GameOutput),
    #[serde(rename = "open-game")]
    Opened(GameOpened),
    #[serde(rename = "game-closed")]
    Closed(GameClosed),
}

/// Forwards every event into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DisplayEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DisplayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: DisplayEvent) {
        if self.tx.send(event).is_err() {
            debug!("Display receiver dropped, event discarded");
        }
    }
}

impl DisplaySink for ChannelSink {
    fn game_output(&self, output: GameOutput) {
        self.send(DisplayEvent::Output(output));
    }

    fn game_opened(&self, event: GameOpened) {
        self.send(DisplayEvent::Opened(event));
    }

    fn game_closed(&self, event: GameClosed) {
        self.send(DisplayEvent::Closed(event));
    }
}

/// Writes lifecycle events to the log; output is already traced by the
/// supervisor. For headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn game_output(&self, _output: GameOutput) {}

    fn game_opened(&self, event: GameOpened) {
        info!(
            "Game startup (pid {}, {} running)",
            event.game.pid,
            event.open_games.len()
        );
    }

    fn game_closed(&self, event: GameClosed) {
        info!(
            "Game closed (pid {}, {} running)",
            event.closed_game.pid,
            event.open_games.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logs::StreamKind;

    #[tokio::test]
    async fn channel_sink_serializes_with_ipc_channel_names() {
        let (sink, mut rx) = ChannelSink::new();
        sink.game_output(GameOutput {
            record: StreamKind::Stdout.plain_record("hi"),
            pid: 7,
        });

        let event = rx.recv().await.unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["channel"], "game-output-data");
        assert_eq!(json["payload"]["pid"], 7);
        assert_eq!(json["payload"]["record"]["logger"], "STDOUT");
    }

    #[test]
    fn dropped_receiver_is_not_an_error() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.game_output(GameOutput {
            record: StreamKind::Stderr.plain_record("x"),
            pid: 1,
        });
    }
}
