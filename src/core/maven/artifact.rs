use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::error::{LauncherError, LauncherResult};

/// A parsed Maven coordinate as used in version manifests.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version[:classifier]@extension`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension. Defaults to `"jar"`.
    pub extension: String,
}

impl MavenArtifact {
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let coord = coord.trim();
        let (coord_part, extension) = match coord.rfind('@') {
            Some(idx) => (&coord[..idx], &coord[idx + 1..]),
            None => (coord, "jar"),
        };

        let parts: Vec<&str> = coord_part.split(':').collect();
        if parts.iter().any(|part| part.trim().is_empty()) || extension.is_empty() {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        }

        let classifier = match parts.len() {
            3 => None,
            4 => Some(parts[3].to_string()),
            _ => return Err(LauncherError::InvalidMavenCoordinate(coord.to_string())),
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
            classifier,
            extension: extension.to_string(),
        })
    }

    /// `net.sf.jopt-simple` → `net/sf/jopt-simple`
    pub fn group_path(&self) -> PathBuf {
        self.group_id.split('.').collect()
    }

    /// `artifactId-version[-classifier].extension`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    /// Path relative to the libraries directory, following Maven's local
    /// repository layout: `<group_path>/<artifact_id>/<version>/<filename>`.
    pub fn local_path(&self) -> PathBuf {
        self.group_path()
            .join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        if self.extension != "jar" {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_coordinate() {
        let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:4.6").unwrap();
        assert_eq!(a.group_id, "net.sf.jopt-simple");
        assert_eq!(a.artifact_id, "jopt-simple");
        assert_eq!(a.version, "4.6");
        assert_eq!(a.classifier, None);
        assert_eq!(a.extension, "jar");
    }

    #[test]
    fn parse_with_classifier() {
        let a = MavenArtifact::parse("org.lwjgl.lwjgl:lwjgl-platform:2.9.4-nightly-20150209:natives-windows")
            .unwrap();
        assert_eq!(a.classifier, Some("natives-windows".to_string()));
    }

    #[test]
    fn rejects_incomplete_coordinates() {
        assert!(MavenArtifact::parse("optifine:OptiFine").is_err());
        assert!(MavenArtifact::parse("a::1.0").is_err());
        assert!(MavenArtifact::parse("a:b:c:d:e").is_err());
    }

    #[test]
    fn local_path_construction() {
        let a = MavenArtifact::parse("optifine:OptiFine:1.8.9_HD_U_M5").unwrap();
        assert_eq!(
            a.local_path(),
            PathBuf::from("optifine/OptiFine/1.8.9_HD_U_M5/OptiFine-1.8.9_HD_U_M5.jar")
        );

        let b = MavenArtifact::parse("com.mojang:netty:1.6").unwrap();
        assert_eq!(
            b.local_path(),
            PathBuf::from("com/mojang/netty/1.6/netty-1.6.jar")
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let raw = "org.lwjgl:lwjgl:3.3.3:natives-linux@zip";
        let a = MavenArtifact::parse(raw).unwrap();
        assert_eq!(a.to_string(), raw);
    }
}
