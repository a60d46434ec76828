// ─── Client File Synchronizer ───
// Keeps the launcher-managed client files (injection jars, mapping tools)
// in sync with the remote file list, skipping files whose SHA-1 matches.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::core::config::LauncherConfig;
use crate::core::downloader::{sha1_file, Downloader};
use crate::core::error::{LauncherError, LauncherResult};

/// Remote side of the synchronizer.
#[async_trait]
pub trait RemoteFileSource: Send + Sync {
    /// Relative paths of every client file.
    async fn list_files(&self) -> LauncherResult<Vec<String>>;
    /// SHA-1 published for `file` in its `.sha1` sidecar.
    async fn fetch_checksum(&self, file: &str) -> LauncherResult<String>;
    /// Download `file` to `dest` as a whole-file write.
    async fn download(&self, file: &str, dest: &Path) -> LauncherResult<()>;
}

/// Files API for the list, CDN for contents and checksums.
pub struct HttpRemoteSource {
    downloader: Downloader,
    files_api_url: String,
    cdn_base_url: String,
}

impl HttpRemoteSource {
    pub fn new(downloader: Downloader, files_api_url: &str, cdn_base_url: &str) -> Self {
        let mut cdn_base_url = cdn_base_url.to_string();
        if !cdn_base_url.ends_with('/') {
            cdn_base_url.push('/');
        }
        Self {
            downloader,
            files_api_url: files_api_url.to_string(),
            cdn_base_url,
        }
    }

    pub fn from_config(downloader: Downloader, config: &LauncherConfig) -> Self {
        Self::new(downloader, &config.files_api_url, &config.files_cdn_url)
    }

    fn file_url(&self, file: &str) -> String {
        format!("{}{}", self.cdn_base_url, file.trim_start_matches('/'))
    }
}

#[async_trait]
impl RemoteFileSource for HttpRemoteSource {
    async fn list_files(&self) -> LauncherResult<Vec<String>> {
        let response = self
            .downloader
            .client()
            .get(&self.files_api_url)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: self.files_api_url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Vec<String>>().await?)
    }

    async fn fetch_checksum(&self, file: &str) -> LauncherResult<String> {
        let body = self
            .downloader
            .fetch_text(&format!("{}.sha1", self.file_url(file)))
            .await?;
        first_token(&body)
            .map(ToString::to_string)
            .ok_or_else(|| LauncherError::Other(format!("Empty checksum for {file}")))
    }

    async fn download(&self, file: &str, dest: &Path) -> LauncherResult<()> {
        self.downloader
            .download_file(&self.file_url(file), dest, None)
            .await
    }
}

/// Sidecars look like `<hex>  <filename>`; only the digest matters.
fn first_token(body: &str) -> Option<&str> {
    body.split_whitespace().next()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub up_to_date: Vec<String>,
    pub downloaded: Vec<String>,
    pub failed: Vec<String>,
    /// Set when the pass did not run (developer mode or list failure).
    pub skipped: bool,
}

pub struct ClientFileSynchronizer<S> {
    source: S,
    /// Absolute client directory (`<game root>/dragonfly`).
    local_root: PathBuf,
    developer_mode: bool,
}

impl<S: RemoteFileSource> ClientFileSynchronizer<S> {
    pub fn new(source: S, local_root: impl Into<PathBuf>, developer_mode: bool) -> Self {
        Self {
            source,
            local_root: local_root.into(),
            developer_mode,
        }
    }

    /// Run one synchronization pass. Never fails: list errors degrade to a
    /// skipped pass and per-file errors are collected in the report.
    #[instrument(skip(self), fields(root = %self.local_root.display()))]
    pub async fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();

        if self.developer_mode {
            info!("Skipping client file download due to developer mode being enabled");
            report.skipped = true;
            return report;
        }

        let files = match self.source.list_files().await {
            Ok(files) => files,
            Err(err) => {
                warn!("Couldn't fetch client file list: {}", err);
                report.skipped = true;
                return report;
            }
        };
        info!("Synchronizing client files ({})", files.len());

        for file in files {
            match self.sync_file(&file).await {
                Ok(true) => report.downloaded.push(file),
                Ok(false) => report.up_to_date.push(file),
                Err(err) => {
                    warn!("Failed to synchronize {}: {}", file, err);
                    report.failed.push(file);
                }
            }
        }

        info!(
            "Client files: {} downloaded, {} up to date, {} failed",
            report.downloaded.len(),
            report.up_to_date.len(),
            report.failed.len()
        );
        report
    }

    /// Returns whether the file was downloaded.
    async fn sync_file(&self, file: &str) -> LauncherResult<bool> {
        let local = self.local_path(file)?;

        if local.is_file() {
            match self.is_current(file, &local).await {
                Ok(true) => {
                    debug!("{} is up to date", file);
                    return Ok(false);
                }
                Ok(false) => debug!("{} changed remotely", file),
                Err(err) => debug!("Could not verify {}: {}", file, err),
            }
        }

        debug!("Downloading {}", file);
        self.source.download(file, &local).await?;
        Ok(true)
    }

    async fn is_current(&self, file: &str, local: &Path) -> LauncherResult<bool> {
        let local_hash = sha1_file(local).await?;
        let remote_hash = self.source.fetch_checksum(file).await?;
        Ok(local_hash.eq_ignore_ascii_case(remote_hash.trim()))
    }

    /// Map a remote relative path below the client directory, refusing
    /// anything that would escape it.
    fn local_path(&self, file: &str) -> LauncherResult<PathBuf> {
        let relative = Path::new(file);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if file.trim().is_empty() || escapes {
            return Err(LauncherError::Other(format!(
                "Refusing remote path outside the client directory: {file}"
            )));
        }
        Ok(self.local_root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::core::downloader::sha1_bytes;

    #[derive(Default)]
    struct FakeSource {
        files: HashMap<String, Vec<u8>>,
        list_fails: bool,
        downloads: Mutex<Vec<String>>,
        checksum_requests: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(files: &[(&str, &[u8])]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(name, body)| (name.to_string(), body.to_vec()))
                    .collect(),
                ..Self::default()
            }
        }

        fn downloads(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteFileSource for FakeSource {
        async fn list_files(&self) -> LauncherResult<Vec<String>> {
            if self.list_fails {
                return Err(LauncherError::Other("offline".into()));
            }
            let mut names: Vec<String> = self.files.keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn fetch_checksum(&self, file: &str) -> LauncherResult<String> {
            self.checksum_requests.lock().unwrap().push(file.to_string());
            Ok(format!("{}  {}", sha1_bytes(&self.files[file]), file))
                .map(|body| first_token(&body).unwrap().to_string())
        }

        async fn download(&self, file: &str, dest: &Path) -> LauncherResult<()> {
            self.downloads.lock().unwrap().push(file.to_string());
            let body = self
                .files
                .get(file)
                .ok_or_else(|| LauncherError::DownloadFailed {
                    url: file.to_string(),
                    status: 404,
                })?;
            tokio::fs::create_dir_all(dest.parent().unwrap()).await?;
            tokio::fs::write(dest, body).await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn matching_local_file_is_not_downloaded() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("dragonfly");
        std::fs::create_dir_all(root.join("injection")).unwrap();
        std::fs::write(root.join("injection/agent-shared.jar"), b"agent").unwrap();

        let source = FakeSource::with(&[
            ("injection/agent-shared.jar", b"agent"),
            ("injection/dragonfly-core.jar", b"core"),
        ]);
        let sync = ClientFileSynchronizer::new(source, &root, false);
        let report = sync.sync().await;

        assert_eq!(report.up_to_date, vec!["injection/agent-shared.jar"]);
        assert_eq!(report.downloaded, vec!["injection/dragonfly-core.jar"]);
        assert_eq!(sync.source.downloads(), vec!["injection/dragonfly-core.jar"]);
        assert_eq!(
            *sync.source.checksum_requests.lock().unwrap(),
            vec!["injection/agent-shared.jar"]
        );
        assert_eq!(
            std::fs::read(root.join("injection/dragonfly-core.jar")).unwrap(),
            b"core"
        );
    }

    #[tokio::test]
    async fn stale_local_file_is_replaced() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("bin")).unwrap();
        std::fs::write(temp.path().join("bin/tool.jar"), b"old").unwrap();

        let sync = ClientFileSynchronizer::new(
            FakeSource::with(&[("bin/tool.jar", b"new")]),
            temp.path(),
            false,
        );
        let report = sync.sync().await;

        assert_eq!(report.downloaded, vec!["bin/tool.jar"]);
        assert_eq!(std::fs::read(temp.path().join("bin/tool.jar")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn developer_mode_skips_the_pass() {
        let temp = tempfile::tempdir().unwrap();
        let sync = ClientFileSynchronizer::new(FakeSource::with(&[("a.jar", b"a")]), temp.path(), true);

        let report = sync.sync().await;
        assert!(report.skipped);
        assert!(sync.source.downloads().is_empty());
    }

    #[tokio::test]
    async fn list_failure_degrades_to_a_skipped_pass() {
        let temp = tempfile::tempdir().unwrap();
        let source = FakeSource {
            list_fails: true,
            ..FakeSource::default()
        };
        let report = ClientFileSynchronizer::new(source, temp.path(), false).sync().await;

        assert!(report.skipped);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn escaping_paths_fail_individually() {
        let temp = tempfile::tempdir().unwrap();
        let sync = ClientFileSynchronizer::new(
            FakeSource::with(&[("../evil.jar", b"x"), ("ok.jar", b"ok")]),
            temp.path(),
            false,
        );
        let report = sync.sync().await;

        assert_eq!(report.failed, vec!["../evil.jar"]);
        assert_eq!(report.downloaded, vec!["ok.jar"]);
        assert_eq!(sync.source.downloads(), vec!["ok.jar"]);
    }

    #[test]
    fn checksum_sidecar_keeps_only_the_digest() {
        assert_eq!(
            first_token("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d  agent-shared.jar\n"),
            Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
        );
        assert_eq!(first_token("   "), None);
    }
}
