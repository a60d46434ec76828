// ─── Launcher ───
// Runs one launch attempt end to end:
//   version → account → client files, Java, natives, classpath → spawn
// Each stage hands an owned result to the next. Any error aborts the
// attempt; after spawning, the supervisor owns the game until it exits.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::core::auth::{setup_account, AccountProvider, LaunchAccount};
use crate::core::config::LauncherConfig;
use crate::core::downloader::Downloader;
use crate::core::edition::Edition;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::java::ensure_java_runtime;
use crate::core::launch::{
    build_classpath, compile_mappings, spawn_game, AssembledLaunch, LaunchCommand, Supervisor,
};
use crate::core::natives::NativeStager;
use crate::core::registry::{GameObject, ProcessRegistry};
use crate::core::sink::DisplaySink;
use crate::core::sync::{ClientFileSynchronizer, HttpRemoteSource, SyncReport};
use crate::core::version::{load_manifest, locate_version, InstalledVersion, VersionManifest};

pub use crate::core::launch::{GameExit, LaunchOptions, LaunchState, StatusCallback};

/// A game that reached `Running`.
#[derive(Debug)]
pub struct RunningGame {
    pub game: GameObject,
    exit: JoinHandle<GameExit>,
}

impl RunningGame {
    pub fn pid(&self) -> u32 {
        self.game.pid
    }

    /// Wait for the game to exit. Dropping a `RunningGame` instead leaves
    /// the game and its supervisor running.
    pub async fn wait(self) -> LauncherResult<GameExit> {
        self.exit
            .await
            .map_err(|e| LauncherError::Other(format!("Task join error: {e}")))
    }
}

pub struct Launcher {
    config: LauncherConfig,
    downloader: Downloader,
    accounts: Arc<dyn AccountProvider>,
    registry: ProcessRegistry,
    sink: Arc<dyn DisplaySink>,
}

impl Launcher {
    pub fn new(
        config: LauncherConfig,
        client: Client,
        accounts: Arc<dyn AccountProvider>,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            config,
            downloader: Downloader::new(client),
            accounts,
            registry: ProcessRegistry::new(sink.clone()),
            sink,
        }
    }

    /// Launcher with the default HTTP client.
    pub fn from_config(
        config: LauncherConfig,
        accounts: Arc<dyn AccountProvider>,
        sink: Arc<dyn DisplaySink>,
    ) -> LauncherResult<Self> {
        Ok(Self::new(config, build_http_client()?, accounts, sink))
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Launch `edition`. Returns once the game process is running; the
    /// final `Closed`/`Crashed` state arrives through `status` and
    /// [`RunningGame::wait`].
    #[instrument(skip_all, fields(attempt = %Uuid::new_v4(), edition = %edition.identifier))]
    pub async fn launch(
        &self,
        edition: &Edition,
        options: LaunchOptions,
        status: StatusCallback,
    ) -> LauncherResult<RunningGame> {
        match self.run(edition, options, &status).await {
            Ok(running) => Ok(running),
            Err(err) => {
                error!("Launch of {} failed: {}", edition.identifier, err);
                if let Some(hint) = err.remediation() {
                    info!("{}", hint);
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        edition: &Edition,
        options: LaunchOptions,
        status: &StatusCallback,
    ) -> LauncherResult<RunningGame> {
        let mut progress = Progress::new(status);
        progress.advance(LaunchState::Preparing, "Checking game version");
        let (installed, manifest) = self.prepare_version(edition).await?;

        let account = setup_account(self.accounts.as_ref()).await?;
        progress.advance(
            LaunchState::AccountReady,
            &format!("Logged in as {}", account.username),
        );

        let assembled = self.assemble(edition, &installed, &manifest).await?;
        progress.advance(LaunchState::AssetsReady, "Game files are ready");

        self.spawn(assembled, &account, options, &mut progress)
    }

    // ── Stages ──────────────────────────────────────────

    async fn prepare_version(
        &self,
        edition: &Edition,
    ) -> LauncherResult<(InstalledVersion, VersionManifest)> {
        let installed = locate_version(&self.config.minecraft_dir, edition)?;
        let manifest = load_manifest(&installed).await?;
        debug!(
            "Version {} declares {} libraries",
            installed.minecraft_version,
            manifest.libraries.len()
        );
        Ok((installed, manifest))
    }

    async fn assemble(
        &self,
        edition: &Edition,
        installed: &InstalledVersion,
        manifest: &VersionManifest,
    ) -> LauncherResult<AssembledLaunch> {
        let layout = self.config.layout();
        let version = edition.minecraft_version.as_str();

        let synced = self.sync_client_files().await;
        if !synced.failed.is_empty() {
            info!(
                "{} client files could not be updated, continuing with local copies",
                synced.failed.len()
            );
        }

        let java_exe = ensure_java_runtime(&self.config, &self.downloader).await?;

        let staged = NativeStager::new(self.config.minecraft_dir.clone(), layout.clone())
            .stage(manifest, version)
            .await?;
        if !staged.missing.is_empty() {
            info!("{} native libraries were not found", staged.missing.len());
        }

        let classpath = build_classpath(manifest, edition, &self.config, &installed.game_jar)?;
        classpath.verify(&self.config.minecraft_dir)?;
        debug!("Classpath has {} entries", classpath.len());

        let assets_index = manifest
            .assets_index_id()
            .ok_or_else(|| LauncherError::Configuration {
                path: installed.json_file.clone(),
                message: "no asset index declared".into(),
            })?
            .to_string();
        let log_config: Option<PathBuf> = manifest.logging_config_id().map(|id| layout.log_config(id));

        if self.config.compile_mappings {
            compile_mappings(&java_exe, &self.config, version).await;
        }

        Ok(AssembledLaunch {
            edition: edition.clone(),
            java_exe,
            classpath,
            natives_dir: staged.natives_dir,
            assets_index,
            log_config,
        })
    }

    async fn sync_client_files(&self) -> SyncReport {
        let source = HttpRemoteSource::from_config(self.downloader.clone(), &self.config);
        let root = self
            .config
            .minecraft_dir
            .join(self.config.layout().client_dir());
        ClientFileSynchronizer::new(source, root, self.config.developer_mode)
            .sync()
            .await
    }

    fn spawn(
        &self,
        assembled: AssembledLaunch,
        account: &LaunchAccount,
        options: LaunchOptions,
        progress: &mut Progress<'_>,
    ) -> LauncherResult<RunningGame> {
        let command = LaunchCommand::build(&assembled, account, &self.config);
        progress.advance(LaunchState::Spawning, "Starting the game");
        debug!("Command: {}", command.to_command_line());

        let spawned = spawn_game(&command)?;
        let game = GameObject {
            pid: spawned.pid,
            game_version: assembled.edition.minecraft_version.clone(),
            player_uuid: account.uuid.clone(),
            started_at: spawned.started_at,
        };

        // Registered before the supervisor starts so its exit always finds
        // the entry.
        self.registry.register(game.clone(), options.open_game_output);
        progress.advance(
            LaunchState::Running,
            &format!("Game is running (pid {})", game.pid),
        );

        let exit = Supervisor {
            registry: self.registry.clone(),
            sink: self.sink.clone(),
            options,
            status: progress.status.clone(),
        }
        .supervise(spawned.child, game.clone());

        Ok(RunningGame { game, exit })
    }
}

/// Current state of one attempt; every reported change must be a legal
/// transition.
struct Progress<'a> {
    status: &'a StatusCallback,
    state: LaunchState,
}

impl<'a> Progress<'a> {
    fn new(status: &'a StatusCallback) -> Self {
        Self {
            status,
            state: LaunchState::Idle,
        }
    }

    fn advance(&mut self, next: LaunchState, message: &str) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal launch transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        info!("[{}] {}", next, message);
        (self.status)(next, message);
    }
}
