// ─── Classpath Builder ───
// Constructs the ordered classpath for launching the game.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::config::LauncherConfig;
use crate::core::edition::Edition;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::MavenArtifact;
use crate::core::version::VersionManifest;

/// Ordered classpath entries, relative to the game root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uses `;` on Windows, `:` on Linux/macOS.
    pub fn joined(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_string_lossy())
            .collect::<Vec<_>>()
            .join(classpath_separator())
    }

    /// Every entry must exist below `root` before the JVM is started.
    pub fn verify(&self, root: &Path) -> LauncherResult<()> {
        match self.entries.iter().find(|entry| !root.join(entry).is_file()) {
            Some(missing) => Err(LauncherError::MissingLibrary(missing.clone())),
            None => Ok(()),
        }
    }

    fn push(&mut self, seen: &mut HashSet<PathBuf>, entry: PathBuf) {
        if seen.insert(entry.clone()) {
            self.entries.push(entry);
        } else {
            debug!("Duplicate classpath entry skipped: {:?}", entry);
        }
    }
}

pub fn classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Builds the classpath for an edition.
///
/// Order:
/// 1. manifest libraries, as declared (OS-disallowed and nameless ones skipped)
/// 2. OptiFine + its launch wrapper, or the vanilla launch wrapper
/// 3. core injection jar
/// 4. version-specific injection hook jar
/// 5. game jar
pub fn build_classpath(
    manifest: &VersionManifest,
    edition: &Edition,
    config: &LauncherConfig,
    game_jar: &Path,
) -> LauncherResult<Classpath> {
    let libraries = PathBuf::from("libraries");
    let layout = config.layout();

    let mut trailing = Vec::with_capacity(5);
    for coordinate in edition_libraries(edition, config) {
        let artifact = MavenArtifact::parse(&coordinate)?;
        trailing.push(libraries.join(artifact.local_path()));
    }
    trailing.push(layout.core_jar());
    trailing.push(layout.hook_jar(&edition.minecraft_version));
    trailing.push(game_jar.to_path_buf());

    let mut classpath = Classpath {
        entries: Vec::with_capacity(manifest.libraries.len() + trailing.len()),
    };
    // Manifest copies of a trailing jar are dropped; the trailing sequence
    // keeps its fixed position.
    let mut seen: HashSet<PathBuf> = trailing.iter().cloned().collect();

    for library in &manifest.libraries {
        if !library.is_allowed_for_current_os() {
            debug!("Library {} disallowed on this OS", library.display_name());
            continue;
        }
        if let Some(source) = library.source()? {
            classpath.push(&mut seen, libraries.join(source.relative_path()));
        }
    }

    classpath.entries.extend(trailing);

    debug!("Including {} libraries", classpath.len());
    Ok(classpath)
}

fn edition_libraries(edition: &Edition, config: &LauncherConfig) -> Vec<String> {
    match edition.optifine() {
        Some(optifine) => vec![
            format!(
                "optifine:OptiFine:{}_{}",
                edition.minecraft_version, optifine
            ),
            format!(
                "optifine:launchwrapper-of:{}",
                config.optifine_launchwrapper_version
            ),
        ],
        None => vec![config.vanilla_launchwrapper.clone()],
    }
}
