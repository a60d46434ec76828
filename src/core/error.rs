use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launch orchestrator.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Launch preconditions ────────────────────────────
    #[error("Minecraft {version} is not installed (missing {missing:?})")]
    VersionNotInstalled {
        version: String,
        optifine: Option<String>,
        missing: PathBuf,
    },

    #[error("Invalid version configuration {path:?}: {message}")]
    Configuration { path: PathBuf, message: String },

    #[error("Classpath entry does not exist: {0:?}")]
    MissingLibrary(PathBuf),

    #[error("No authenticated account selected")]
    Unauthenticated,

    #[error("No usable Java runtime: {0}")]
    JavaNotFound(String),

    // ── Process ─────────────────────────────────────────
    #[error("Could not start the game process: {0}")]
    Launch(String),

    #[error("No running game with pid {0}")]
    ProcessNotFound(u32),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Errors the user has to fix before relaunching. They abort the launch
    /// attempt and are never retried automatically.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LauncherError::VersionNotInstalled { .. }
                | LauncherError::MissingLibrary(_)
                | LauncherError::Unauthenticated
                | LauncherError::JavaNotFound(_)
        )
    }

    /// Actionable message for the modal shown when a launch attempt fails.
    pub fn remediation(&self) -> Option<String> {
        match self {
            LauncherError::VersionNotInstalled {
                version, optifine, ..
            } => {
                let mut text = format!(
                    "Please make sure to download and run Minecraft {version} from the Minecraft Launcher first."
                );
                if let Some(optifine) = optifine {
                    text.push_str(&format!(
                        " Additionally OptiFine {optifine} must be installed which can be downloaded on https://www.optifine.net."
                    ));
                }
                Some(text)
            }
            LauncherError::Unauthenticated => Some(
                "Please make sure to login with a Minecraft or Mojang account before starting the game."
                    .into(),
            ),
            LauncherError::MissingLibrary(path) => Some(format!(
                "The library {} is missing. Start the version once from the official launcher to restore it.",
                path.display()
            )),
            LauncherError::JavaNotFound(_) => Some(
                "Install a Java runtime or configure its path in the launcher settings.".into(),
            ),
            LauncherError::Launch(reason) => Some(format!(
                "The game process could not be created ({reason}). Check your Java installation."
            )),
            _ => None,
        }
    }
}

// ── Serialization for display sinks ─────────────────────
// Errors cross the same boundary as log records, so they serialize to text.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_not_installed_mentions_optifine_when_selected() {
        let err = LauncherError::VersionNotInstalled {
            version: "1.8.9".into(),
            optifine: Some("HD_U_M5".into()),
            missing: PathBuf::from("versions/1.8.9"),
        };

        assert!(err.is_precondition());
        let hint = err.remediation().unwrap();
        assert!(hint.contains("Minecraft 1.8.9"));
        assert!(hint.contains("OptiFine HD_U_M5"));
    }

    #[test]
    fn soft_errors_are_not_preconditions() {
        let err = LauncherError::DownloadFailed {
            url: "https://example.com/a.jar".into(),
            status: 404,
        };
        assert!(!err.is_precondition());
        assert!(err.remediation().is_none());
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&LauncherError::ProcessNotFound(42)).unwrap();
        assert_eq!(json, "\"No running game with pid 42\"");
    }
}
