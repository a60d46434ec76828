use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Streaming downloader with whole-file writes and optional SHA-1 checks.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // ── Single file download ────────────────────────────

    /// Download `url` to `dest`, optionally validating SHA-1.
    ///
    /// Bytes are streamed into `<dest>.part` and renamed over `dest` only once
    /// the body is complete and verified, so readers never see a torn file.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> LauncherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let part = part_path(dest);
        let result = write_stream(response, &part, sha1_expected, dest).await;
        if let Err(err) = result {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(err);
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| LauncherError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    /// Fetch a small text resource such as a `.sha1` sidecar.
    pub async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Validate an existing file's SHA-1.
    pub async fn validate_sha1(path: &Path, expected: &str) -> LauncherResult<bool> {
        let actual = sha1_file(path).await?;
        Ok(actual.eq_ignore_ascii_case(expected.trim()))
    }
}

async fn write_stream(
    response: reqwest::Response,
    part: &Path,
    sha1_expected: Option<&str>,
    dest: &Path,
) -> LauncherResult<()> {
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(|e| LauncherError::Io {
            path: part.to_path_buf(),
            source: e,
        })?;

    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        file.write_all(&chunk).await.map_err(|e| LauncherError::Io {
            path: part.to_path_buf(),
            source: e,
        })?;
    }
    file.flush().await.map_err(|e| LauncherError::Io {
        path: part.to_path_buf(),
        source: e,
    })?;
    // Handle must be closed before the rename on Windows.
    drop(file);

    if let Some(expected) = sha1_expected {
        let actual = hex::encode(hasher.finalize());
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(LauncherError::Sha1Mismatch {
                path: dest.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
    }
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Lowercase hex SHA-1 of a file's contents.
pub async fn sha1_file(path: &Path) -> LauncherResult<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| LauncherError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(sha1_bytes(&bytes))
}

pub fn sha1_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_file_is_a_sibling() {
        assert_eq!(
            part_path(Path::new("dragonfly/injection/agent-shared.jar")),
            PathBuf::from("dragonfly/injection/agent-shared.jar.part")
        );
    }

    #[tokio::test]
    async fn sha1_of_known_content() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("hello.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let digest = sha1_file(&path).await.unwrap();
        assert_eq!(digest, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
        assert!(Downloader::validate_sha1(&path, "AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D\n")
            .await
            .unwrap());
    }
}
