use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

use super::layout::ClientLayout;

const APP_DIR_NAME: &str = "Dragonfly";
const SETTINGS_FILE: &str = "launcher_settings.json";
const DEVELOPER_ENV: &str = "DRAGONFLY_DEVELOPER";
const DEVELOPER_KEY_SHA256: &str =
    "5d5907b8c857c9c50844e506c4620a2e2bdca7d485d6d11c973772436b656055";

/// Launcher settings consumed by the launch pipeline.
///
/// Every field has a default so partially written settings files keep
/// loading after upgrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Game root (`.minecraft`). Child processes run with this as cwd.
    pub minecraft_dir: PathBuf,
    /// Launcher-owned data (managed Java runtime, settings file).
    pub data_dir: PathBuf,
    /// Explicit Java executable; skips runtime provisioning when it exists.
    pub java_path: Option<PathBuf>,
    /// Client directory inside the game root holding injection jars,
    /// natives, log configs and mappings.
    pub client_dir_name: String,
    pub files_api_url: String,
    pub files_cdn_url: String,
    pub main_class: String,
    pub core_injection_class: String,
    pub optifine_tweak_class: String,
    pub optifine_launchwrapper_version: String,
    pub vanilla_launchwrapper: String,
    pub user_type: String,
    pub compile_mappings: bool,
    pub developer_mode: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            minecraft_dir: default_minecraft_dir(),
            data_dir: default_data_dir(),
            java_path: None,
            client_dir_name: "dragonfly".into(),
            files_api_url: "https://api.playdragonfly.net/v1/client/files".into(),
            files_cdn_url: "https://cdn.icnet.dev/dragonfly/client/".into(),
            main_class: "net.minecraft.launchwrapper.Launch".into(),
            core_injection_class: "net.dragonfly.core.DragonflyCore".into(),
            optifine_tweak_class: "optifine.OptiFineTweaker".into(),
            optifine_launchwrapper_version: "2.2".into(),
            vanilla_launchwrapper: "net.minecraft:launchwrapper:1.12".into(),
            user_type: "mojang".into(),
            compile_mappings: true,
            developer_mode: developer_mode_from_env(),
        }
    }
}

impl LauncherConfig {
    /// Settings rooted at an arbitrary game directory, used by tests and
    /// embedders that manage their own installation.
    pub fn with_minecraft_dir(minecraft_dir: impl Into<PathBuf>) -> Self {
        Self {
            minecraft_dir: minecraft_dir.into(),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> ClientLayout {
        ClientLayout::new(&self.client_dir_name)
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.minecraft_dir.join("libraries")
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.data_dir.join("jre")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Load `launcher_settings.json` from `data_dir`, falling back to
    /// defaults when the file does not exist yet.
    pub fn load(data_dir: &Path) -> LauncherResult<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {:?}, using defaults", path);
                return Ok(Self {
                    data_dir: data_dir.to_path_buf(),
                    ..Self::default()
                });
            }
            Err(source) => return Err(LauncherError::Io { path, source }),
        };

        let mut config: LauncherConfig =
            serde_json::from_str(&raw).map_err(|e| LauncherError::Configuration {
                path: path.clone(),
                message: e.to_string(),
            })?;
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn save(&self) -> LauncherResult<()> {
        let path = self.settings_path();
        std::fs::create_dir_all(&self.data_dir).map_err(|source| LauncherError::Io {
            path: self.data_dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|source| LauncherError::Io { path, source })
    }
}

/// Developer mode is unlocked by setting `DRAGONFLY_DEVELOPER` to the
/// developer key; only its SHA-256 is known to the launcher.
pub fn developer_mode_from_env() -> bool {
    match std::env::var(DEVELOPER_ENV) {
        Ok(value) => is_developer_key(&value),
        Err(_) => false,
    }
}

pub fn is_developer_key(value: &str) -> bool {
    let digest = hex::encode(Sha256::digest(value.as_bytes()));
    let unlocked = digest == DEVELOPER_KEY_SHA256;
    if !unlocked {
        warn!("{} is set but does not match the developer key", DEVELOPER_ENV);
    }
    unlocked
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    default_base_dir().join(APP_DIR_NAME)
}

/// Where the official launcher installs the game on each platform.
fn default_minecraft_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        default_base_dir().join(".minecraft")
    } else if cfg!(target_os = "macos") {
        default_base_dir().join("minecraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }
}
