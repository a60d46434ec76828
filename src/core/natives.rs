// ─── Native Library Stager ───
// Extracts the platform natives of a version into a persistent,
// version-scoped directory. Extraction happens in a scratch directory first;
// the persistent directory is only swapped when the content changed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::archive::{copy_dir_recursive, extract_zip_async};
use crate::core::config::ClientLayout;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::downloader::sha1_bytes;
use crate::core::maven::MavenArtifact;
use crate::core::version::{current_os_name, LibraryEntry, VersionManifest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Fresh extraction matched the existing natives; nothing was touched.
    UpToDate,
    /// The natives directory was (re)created from the fresh extraction.
    Replaced,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub outcome: StageOutcome,
    /// Natives directory, relative to the game root.
    pub natives_dir: PathBuf,
    /// Native JARs named by the manifest but absent under `libraries/`.
    pub missing: Vec<PathBuf>,
}

/// `(relative path, size, sha1)` of every file in a tree.
type Fingerprint = BTreeSet<(String, u64, String)>;

pub struct NativeStager {
    minecraft_dir: PathBuf,
    layout: ClientLayout,
}

impl NativeStager {
    pub fn new(minecraft_dir: impl Into<PathBuf>, layout: ClientLayout) -> Self {
        Self {
            minecraft_dir: minecraft_dir.into(),
            layout,
        }
    }

    pub async fn stage(
        &self,
        manifest: &VersionManifest,
        minecraft_version: &str,
    ) -> LauncherResult<StageReport> {
        let natives_dir = self.layout.natives_dir(minecraft_version);
        let scratch = self
            .minecraft_dir
            .join(self.layout.natives_extract_dir(minecraft_version));
        let target = self.minecraft_dir.join(&natives_dir);

        recreate_dir(&scratch).await?;

        let libraries_dir = self.minecraft_dir.join("libraries");
        let mut missing = Vec::new();

        for library in manifest
            .libraries
            .iter()
            .filter(|lib| lib.is_allowed_for_current_os())
        {
            let Some(relative) = native_jar_path(library)? else {
                continue;
            };

            let jar = libraries_dir.join(&relative);
            if !jar.is_file() {
                warn!(
                    "Native library {} not found at {:?}, skipping",
                    library.display_name(),
                    jar
                );
                missing.push(relative);
                continue;
            }

            debug!("Extracting natives of {}", library.display_name());
            extract_native_jar(&jar, &scratch).await?;
        }

        remove_dir_if_exists(&scratch.join("META-INF")).await?;

        if target.is_dir() && fingerprint(&scratch).await? == fingerprint(&target).await? {
            remove_dir_if_exists(&scratch).await?;
            info!("Natives for {} are up to date", minecraft_version);
            return Ok(StageReport {
                outcome: StageOutcome::UpToDate,
                natives_dir,
                missing,
            });
        }

        replace_dir(&scratch, &target).await?;
        info!("Natives for {} staged at {:?}", minecraft_version, target);
        Ok(StageReport {
            outcome: StageOutcome::Replaced,
            natives_dir,
            missing,
        })
    }
}

/// Path of the native JAR below `libraries/`, preferring the manifest's
/// `classifiers` download and falling back to the coordinate + classifier.
fn native_jar_path(library: &LibraryEntry) -> LauncherResult<Option<PathBuf>> {
    if let Some(download) = library.native_download() {
        return Ok(Some(
            download.path.split('/').filter(|s| !s.is_empty()).collect(),
        ));
    }

    let has_natives = library
        .natives
        .as_ref()
        .map(|natives| natives.contains_key(current_os_name()))
        .unwrap_or(false);
    let name = match library.name.as_deref() {
        Some(name) if has_natives => name,
        _ => return Ok(None),
    };

    let mut artifact = MavenArtifact::parse(name)?;
    artifact.classifier = Some(library.native_classifier_for_current_os());
    Ok(Some(artifact.local_path()))
}

// ── Filesystem helpers ──────────────────────────────────

async fn remove_dir_if_exists(dir: &Path) -> LauncherResult<()> {
    if dir.exists() {
        tokio::fs::remove_dir_all(dir)
            .await
            .map_err(|source| LauncherError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}

async fn recreate_dir(dir: &Path) -> LauncherResult<()> {
    remove_dir_if_exists(dir).await?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| LauncherError::Io {
            path: dir.to_path_buf(),
            source,
        })
}

/// Copy the JAR into the scratch dir as a `.zip`, unpack it there and drop
/// the copy.
async fn extract_native_jar(jar: &Path, scratch: &Path) -> LauncherResult<()> {
    let stem = jar
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "natives".into());
    let copy = scratch.join(format!("{stem}.zip"));

    tokio::fs::copy(jar, &copy)
        .await
        .map_err(|source| LauncherError::Io {
            path: copy.clone(),
            source,
        })?;

    extract_zip_async(&copy, scratch).await?;

    tokio::fs::remove_file(&copy)
        .await
        .map_err(|source| LauncherError::Io { path: copy, source })
}

async fn fingerprint(dir: &Path) -> LauncherResult<Fingerprint> {
    let root = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut set = Fingerprint::new();
        collect_fingerprint(&root, &root, &mut set)?;
        Ok(set)
    })
    .await
    .map_err(|e| LauncherError::Other(format!("Task join error: {e}")))?
}

fn collect_fingerprint(root: &Path, dir: &Path, set: &mut Fingerprint) -> LauncherResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| LauncherError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| LauncherError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            collect_fingerprint(root, &path, set)?;
        } else if file_type.is_file() {
            let bytes = std::fs::read(&path).map_err(|source| LauncherError::Io {
                path: path.clone(),
                source,
            })?;
            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            set.insert((relative, bytes.len() as u64, sha1_bytes(&bytes)));
        }
    }
    Ok(())
}

/// Move `scratch` into `target`, replacing whatever was there. Falls back to
/// copy + delete when the rename crosses filesystems.
async fn replace_dir(scratch: &Path, target: &Path) -> LauncherResult<()> {
    remove_dir_if_exists(target).await?;
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    if let Err(err) = tokio::fs::rename(scratch, target).await {
        debug!("Rename of {:?} failed ({}), copying instead", scratch, err);
        let from = scratch.to_path_buf();
        let to = target.to_path_buf();
        tokio::task::spawn_blocking(move || copy_dir_recursive(&from, &to))
            .await
            .map_err(|e| LauncherError::Other(format!("Task join error: {e}")))??;
        remove_dir_if_exists(scratch).await?;
    }
    Ok(())
}
