// ─── Version File ───
// Parses a Mojang version JSON and evaluates OS rules for libraries.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::MavenArtifact;

/// The parts of a version JSON the launch pipeline relies on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    /// Asset index id (`"1.8"`, `"legacy"`, ...).
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub logging: Option<LoggingInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexInfo {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingInfo {
    #[serde(default)]
    pub client: Option<ClientLogging>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientLogging {
    pub file: LoggingFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingFile {
    pub id: String,
}

impl VersionManifest {
    /// Asset index id, preferring the legacy top-level `assets` field.
    pub fn assets_index_id(&self) -> Option<&str> {
        self.assets
            .as_deref()
            .or_else(|| self.asset_index.as_ref().map(|ai| ai.id.as_str()))
    }

    /// Id of the log4j configuration the client expects (`client-1.7.xml`).
    pub fn logging_config_id(&self) -> Option<&str> {
        self.logging
            .as_ref()?
            .client
            .as_ref()
            .map(|client| client.file.id.as_str())
    }
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<LibraryRule>>,
    /// Legacy `natives` map: OS name → classifier (may contain `${arch}`).
    #[serde(default)]
    pub natives: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
    #[serde(default)]
    pub classifiers: Option<BTreeMap<String, LibraryArtifact>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryArtifact {
    pub path: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Where a library's JAR lives, relative to the libraries directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Derived from `group:artifact:version`.
    Coordinate(MavenArtifact),
    /// Explicit `downloads.artifact.path` of newer manifests.
    Path(String),
}

impl LibrarySource {
    pub fn relative_path(&self) -> PathBuf {
        match self {
            LibrarySource::Coordinate(artifact) => artifact.local_path(),
            LibrarySource::Path(path) => path.split('/').filter(|s| !s.is_empty()).collect(),
        }
    }
}

// ─── OS Rule Evaluation ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
}

impl LibraryEntry {
    /// Rules logic (Mojang format):
    /// - If no rules → allowed.
    /// - Start with "disallowed" and process rules top-to-bottom; each rule
    ///   whose OS matches (or has no OS) sets the state to its action.
    pub fn is_allowed_for_current_os(&self) -> bool {
        let rules = match &self.rules {
            Some(r) => r,
            None => return true,
        };

        let current_os = current_os_name();
        let mut allowed = false;

        for rule in rules {
            let os_matches = match rule.os.as_ref().and_then(|os| os.name.as_deref()) {
                None => true,
                Some(name) => name == current_os,
            };

            if os_matches {
                allowed = rule.action == RuleAction::Allow;
            }
        }

        allowed
    }

    /// Resolve where the classpath JAR of this library lives. Entries without
    /// a name or artifact path contribute nothing to the classpath, and
    /// neither do natives-only entries (`lwjgl-platform` and friends).
    pub fn source(&self) -> LauncherResult<Option<LibrarySource>> {
        if let Some(artifact) = self.downloads.as_ref().and_then(|d| d.artifact.as_ref()) {
            if !artifact.path.trim().is_empty() {
                return Ok(Some(LibrarySource::Path(artifact.path.clone())));
            }
        }

        if self.is_natives_only() {
            return Ok(None);
        }

        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                Ok(Some(LibrarySource::Coordinate(MavenArtifact::parse(name)?)))
            }
            _ => Ok(None),
        }
    }

    /// Ships only classifier JARs: a `natives` map or classifier downloads,
    /// but no main artifact.
    fn is_natives_only(&self) -> bool {
        let has_classifiers = self
            .downloads
            .as_ref()
            .and_then(|d| d.classifiers.as_ref())
            .is_some_and(|c| !c.is_empty());
        self.natives.is_some() || has_classifiers
    }

    /// Classifier key of this library's natives for the current platform.
    pub fn native_classifier_for_current_os(&self) -> String {
        let os = current_os_name();
        if let Some(classifier) = self.natives.as_ref().and_then(|n| n.get(os)) {
            let arch = if cfg!(target_pointer_width = "64") {
                "64"
            } else {
                "32"
            };
            return classifier.replace("${arch}", arch);
        }
        format!("natives-{os}")
    }

    /// Native JAR download for the current platform, if the library has one.
    pub fn native_download(&self) -> Option<&LibraryArtifact> {
        let classifiers = self.downloads.as_ref()?.classifiers.as_ref()?;
        classifiers.get(&self.native_classifier_for_current_os())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

pub fn parse_manifest(raw: &str, path: &std::path::Path) -> LauncherResult<VersionManifest> {
    serde_json::from_str(raw).map_err(|e| LauncherError::Configuration {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(json: serde_json::Value) -> LibraryEntry {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn no_rules_means_allowed() {
        let lib = library(serde_json::json!({ "name": "test:lib:1.0" }));
        assert!(lib.is_allowed_for_current_os());
    }

    #[test]
    fn disallow_current_os() {
        let lib = library(serde_json::json!({
            "name": "test:lib:1.0",
            "rules": [
                { "action": "allow" },
                { "action": "disallow", "os": { "name": current_os_name() } }
            ]
        }));
        assert!(!lib.is_allowed_for_current_os());
    }

    #[test]
    fn artifact_path_takes_precedence_over_name() {
        let lib = library(serde_json::json!({
            "name": "com.mojang:netty:1.6",
            "downloads": { "artifact": { "path": "com/mojang/netty/1.6/netty-1.6.jar" } }
        }));
        assert_eq!(
            lib.source().unwrap(),
            Some(LibrarySource::Path("com/mojang/netty/1.6/netty-1.6.jar".into()))
        );
    }

    #[test]
    fn native_download_uses_natives_map_with_arch() {
        let os = current_os_name();
        let lib = library(serde_json::json!({
            "name": "tv.twitch:twitch-platform:6.5",
            "natives": { os: "natives-${arch}" },
            "downloads": {
                "classifiers": {
                    "natives-64": { "path": "tv/twitch/twitch-platform-6.5-natives-64.jar" },
                    "natives-32": { "path": "tv/twitch/twitch-platform-6.5-natives-32.jar" }
                }
            }
        }));

        let expected = if cfg!(target_pointer_width = "64") {
            "tv/twitch/twitch-platform-6.5-natives-64.jar"
        } else {
            "tv/twitch/twitch-platform-6.5-natives-32.jar"
        };
        assert_eq!(lib.native_download().unwrap().path, expected);
        assert_eq!(lib.source().unwrap(), None);
    }

    #[test]
    fn manifest_exposes_assets_and_logging_ids() {
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "id": "1.8.9",
            "assets": "1.8",
            "logging": { "client": { "file": { "id": "client-1.7.xml" } } },
            "libraries": []
        }))
        .unwrap();

        assert_eq!(manifest.assets_index_id(), Some("1.8"));
        assert_eq!(manifest.logging_config_id(), Some("client-1.7.xml"));
    }

    #[test]
    fn asset_index_object_is_used_without_legacy_field() {
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "assetIndex": { "id": "17", "url": "https://example.com/17.json" }
        }))
        .unwrap();

        assert_eq!(manifest.assets_index_id(), Some("17"));
        assert_eq!(manifest.logging_config_id(), None);
    }
}
