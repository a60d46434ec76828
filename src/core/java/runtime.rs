use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::core::archive::extract_zip_async;
use crate::core::config::LauncherConfig;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};

const RUNTIME_RELEASE_BASE: &str =
    "https://github.com/AdoptOpenJDK/openjdk11-binaries/releases/download/jdk-11.0.9.1%2B1";
const RUNTIME_DIR_NAME: &str = "jdk-11.0.9.1+1-jre";
const ARCHIVE_X64: &str = "OpenJDK11U-jre_x64_windows_hotspot_11.0.9.1_1.zip";
const ARCHIVE_X86: &str = "OpenJDK11U-jre_x86-32_windows_hotspot_11.0.9.1_1.zip";

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "javaw.exe"
    } else {
        "java"
    }
}

/// Executable of the managed runtime below `<data_dir>/jre`.
pub fn managed_java_binary(runtime_dir: &Path) -> PathBuf {
    runtime_dir
        .join(RUNTIME_DIR_NAME)
        .join("bin")
        .join(java_exe())
}

/// Archive published for this platform, if any.
fn runtime_archive() -> Option<&'static str> {
    if !cfg!(target_os = "windows") {
        return None;
    }
    if cfg!(target_pointer_width = "64") {
        Some(ARCHIVE_X64)
    } else {
        Some(ARCHIVE_X86)
    }
}

/// Resolve the Java executable for the game.
///
/// Order: configured path, managed runtime, managed runtime after download
/// (Windows only), then a `java` found through `JAVA_HOME` or `PATH`.
#[instrument(skip_all)]
pub async fn ensure_java_runtime(
    config: &LauncherConfig,
    downloader: &Downloader,
) -> LauncherResult<PathBuf> {
    if let Some(configured) = &config.java_path {
        if configured.is_file() {
            info!("Using configured Java at {:?}", configured);
            return Ok(configured.clone());
        }
        warn!("Configured Java {:?} does not exist, ignoring", configured);
    }

    let runtime_dir = config.runtime_dir();
    let managed = managed_java_binary(&runtime_dir);
    if managed.is_file() {
        info!("Java is installed at {:?}", managed);
        return Ok(managed);
    }

    if let Some(archive) = runtime_archive() {
        install_runtime(downloader, &runtime_dir, archive).await?;
        if managed.is_file() {
            return Ok(managed);
        }
        return Err(LauncherError::JavaNotFound(format!(
            "{archive} did not contain {}",
            managed.display()
        )));
    }

    find_system_java().ok_or_else(|| {
        LauncherError::JavaNotFound("no managed runtime for this platform and no java on PATH".into())
    })
}

async fn install_runtime(
    downloader: &Downloader,
    runtime_dir: &Path,
    archive: &str,
) -> LauncherResult<()> {
    let url = format!("{RUNTIME_RELEASE_BASE}/{archive}");
    let zip_path = runtime_dir.join(archive);

    info!("Downloading Java from {}", url);
    downloader.download_file(&url, &zip_path, None).await?;

    extract_zip_async(&zip_path, runtime_dir).await?;
    tokio::fs::remove_file(&zip_path)
        .await
        .map_err(|source| LauncherError::Io {
            path: zip_path,
            source,
        })?;

    info!("Java has been downloaded to {:?}", runtime_dir);
    Ok(())
}

fn find_system_java() -> Option<PathBuf> {
    let name = if cfg!(windows) { "java.exe" } else { "java" };

    if let Some(home) = std::env::var_os("JAVA_HOME") {
        let candidate = PathBuf::from(home).join("bin").join(name);
        if candidate.is_file() {
            debug!("Using Java from JAVA_HOME: {:?}", candidate);
            return Some(candidate);
        }
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_http_client;

    #[test]
    fn managed_runtime_lives_in_the_versioned_jre_dir() {
        let binary = managed_java_binary(Path::new("/data/jre"));
        assert!(binary.starts_with("/data/jre/jdk-11.0.9.1+1-jre/bin"));
    }

    #[tokio::test]
    async fn configured_java_wins() {
        let temp = tempfile::tempdir().unwrap();
        let java = temp.path().join("java");
        std::fs::write(&java, b"#!/bin/sh").unwrap();

        let mut config = LauncherConfig::with_minecraft_dir(temp.path());
        config.data_dir = temp.path().join("data");
        config.java_path = Some(java.clone());

        let downloader = Downloader::new(build_http_client().unwrap());
        assert_eq!(ensure_java_runtime(&config, &downloader).await.unwrap(), java);
    }

    #[tokio::test]
    async fn installed_managed_runtime_is_reused() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = LauncherConfig::with_minecraft_dir(temp.path());
        config.data_dir = temp.path().join("data");
        let managed = managed_java_binary(&config.runtime_dir());
        std::fs::create_dir_all(managed.parent().unwrap()).unwrap();
        std::fs::write(&managed, b"bin").unwrap();

        let downloader = Downloader::new(build_http_client().unwrap());
        assert_eq!(
            ensure_java_runtime(&config, &downloader).await.unwrap(),
            managed
        );
    }
}
