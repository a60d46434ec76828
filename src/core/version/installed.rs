// ─── Installed Version ───
// Locates an edition's version descriptor and game JAR inside the game root.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::edition::Edition;
use crate::core::error::{LauncherError, LauncherResult};

use super::version_file::{parse_manifest, VersionManifest};

/// Files of an installed version, validated to exist on disk.
#[derive(Debug, Clone)]
pub struct InstalledVersion {
    pub minecraft_version: String,
    pub optifine_version: Option<String>,
    /// `versions/<mc>/<mc>.json`
    pub json_file: PathBuf,
    /// `versions/<edition>/<edition>.jar`, relative to the game root.
    pub game_jar: PathBuf,
}

impl InstalledVersion {
    fn not_installed(edition: &Edition, missing: PathBuf) -> LauncherError {
        LauncherError::VersionNotInstalled {
            version: edition.minecraft_version.clone(),
            optifine: edition.optifine().map(ToString::to_string),
            missing,
        }
    }
}

/// Check that the vanilla version and the edition's launch version are both
/// installed. The vanilla JSON carries libraries and assets; the JAR comes
/// from the OptiFine version directory when the edition selects OptiFine.
pub fn locate_version(minecraft_dir: &Path, edition: &Edition) -> LauncherResult<InstalledVersion> {
    let mc = edition.minecraft_version.as_str();
    let launch_name = edition.launch_version_name();
    let versions_dir = minecraft_dir.join("versions");

    let version_dir = versions_dir.join(mc);
    let json_file = version_dir.join(format!("{mc}.json"));
    let edition_dir = versions_dir.join(&launch_name);
    let game_jar = PathBuf::from("versions")
        .join(&launch_name)
        .join(format!("{launch_name}.jar"));

    for required in [&version_dir, &json_file, &edition_dir] {
        if !required.exists() {
            debug!("Missing {:?}", required);
            return Err(InstalledVersion::not_installed(edition, required.clone()));
        }
    }

    let absolute_jar = minecraft_dir.join(&game_jar);
    if !absolute_jar.is_file() {
        debug!("Missing {:?}", absolute_jar);
        return Err(InstalledVersion::not_installed(edition, absolute_jar));
    }

    info!("Found installed version {} ({})", mc, launch_name);
    Ok(InstalledVersion {
        minecraft_version: mc.to_string(),
        optifine_version: edition.optifine().map(ToString::to_string),
        json_file,
        game_jar,
    })
}

/// Read and parse the vanilla version JSON.
pub async fn load_manifest(installed: &InstalledVersion) -> LauncherResult<VersionManifest> {
    let path = &installed.json_file;
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;

    let manifest = parse_manifest(&raw, path)?;
    debug!(
        "Loaded {:?}: {} libraries, assets {:?}",
        path,
        manifest.libraries.len(),
        manifest.assets_index_id()
    );
    Ok(manifest)
}
