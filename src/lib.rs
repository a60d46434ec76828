pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::auth::{Account, AccountProfile, AccountProvider, StaticAccountProvider};
pub use crate::core::config::LauncherConfig;
pub use crate::core::edition::Edition;
pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::launcher::{
    GameExit, LaunchOptions, LaunchState, Launcher, RunningGame, StatusCallback,
};
pub use crate::core::logs::{LogLevel, LogRecord};
pub use crate::core::registry::{GameObject, ProcessRegistry};
pub use crate::core::sink::{ChannelSink, DisplayEvent, DisplaySink, TracingSink};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter; calling this twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dragonfly_launcher=debug")),
        )
        .try_init();

    tracing::info!("Dragonfly launcher core initialized");
}
