// ─── Game Supervisor ───
// Pumps the child's stdout/stderr through the log parser and waits for the
// exit, which deregisters the game exactly once.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::error::LauncherError;
use crate::core::logs::{LogRecord, LogStreamParser, StreamKind};
use crate::core::registry::{GameObject, ProcessRegistry};
use crate::core::sink::{DisplaySink, GameOutput};

use super::state::{LaunchOptions, LaunchState, StatusCallback};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameExit {
    pub pid: u32,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub state: LaunchState,
}

pub struct Supervisor {
    pub registry: ProcessRegistry,
    pub sink: Arc<dyn DisplaySink>,
    pub options: LaunchOptions,
    pub status: StatusCallback,
}

impl Supervisor {
    /// Take over a registered child. The returned handle resolves once the
    /// game has exited and both streams are drained.
    pub fn supervise(self, mut child: Child, game: GameObject) -> JoinHandle<GameExit> {
        let pid = game.pid;
        let stdout = child
            .stdout
            .take()
            .map(|out| tokio::spawn(pump(out, StreamKind::Stdout, pid, self.sink.clone())));
        let stderr = child
            .stderr
            .take()
            .map(|err| tokio::spawn(pump(err, StreamKind::Stderr, pid, self.sink.clone())));

        tokio::spawn(async move {
            let status = child.wait().await;

            for handle in [stdout, stderr].into_iter().flatten() {
                if let Err(err) = handle.await {
                    warn!("Output pump of pid {} failed: {}", pid, err);
                }
            }

            let code = match &status {
                Ok(status) => status.code(),
                Err(err) => {
                    warn!("Waiting for pid {} failed: {}", pid, err);
                    None
                }
            };
            let state = match code {
                Some(0) => LaunchState::Closed,
                _ => LaunchState::Crashed,
            };
            debug_assert!(LaunchState::Running.can_advance_to(state));

            match self.registry.deregister(pid, self.options.close_game_output) {
                Ok(_) | Err(LauncherError::ProcessNotFound(_)) => {}
                Err(err) => warn!("Could not deregister pid {}: {}", pid, err),
            }

            let message = match code {
                Some(code) => format!("Game exited with code {code}"),
                None => "Game was terminated".to_string(),
            };
            info!("{} (pid {}, {} running)", message, pid, self.registry.len());
            (self.status)(state, &message);

            GameExit { pid, code, state }
        })
    }
}

async fn pump<R: AsyncRead + Unpin>(
    mut reader: R,
    stream: StreamKind,
    pid: u32,
    sink: Arc<dyn DisplaySink>,
) {
    let mut parser = LogStreamParser::new(stream);
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => forward(parser.feed(&buf[..n]), pid, sink.as_ref()),
            Err(err) => {
                debug!("Reading {:?} of pid {} failed: {}", stream, pid, err);
                break;
            }
        }
    }
    forward(parser.finish(), pid, sink.as_ref());
}

fn forward(records: Vec<LogRecord>, pid: u32, sink: &dyn DisplaySink) {
    for record in records {
        debug!(target: "game", pid, "[{}] [{}] {}", record.level, record.logger, record.message);
        sink.game_output(GameOutput { record, pid });
    }
}
