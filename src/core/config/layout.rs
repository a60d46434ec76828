// ─── Client Layout ───
// Relative locations inside the game root. Everything the launcher passes to
// the JVM is relative to the game root because the child runs with it as cwd.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientLayout {
    client_dir: PathBuf,
}

impl ClientLayout {
    pub fn new(client_dir_name: &str) -> Self {
        Self {
            client_dir: PathBuf::from(client_dir_name),
        }
    }

    pub fn client_dir(&self) -> &PathBuf {
        &self.client_dir
    }

    fn injection_dir(&self) -> PathBuf {
        self.client_dir.join("injection")
    }

    pub fn agent_jar(&self) -> PathBuf {
        self.injection_dir().join("agent-shared.jar")
    }

    pub fn core_jar(&self) -> PathBuf {
        self.injection_dir().join("dragonfly-core.jar")
    }

    pub fn hook_jar(&self, minecraft_version: &str) -> PathBuf {
        self.injection_dir()
            .join(format!("injection-hook-{minecraft_version}.jar"))
    }

    /// Persistent natives directory for one game version.
    pub fn natives_dir(&self, minecraft_version: &str) -> PathBuf {
        self.client_dir.join(format!("natives-{minecraft_version}"))
    }

    /// Scratch directory for natives, scoped per version so launches of
    /// different versions never share it.
    pub fn natives_extract_dir(&self, minecraft_version: &str) -> PathBuf {
        self.client_dir
            .join("tmp")
            .join(format!("natives_extract-{minecraft_version}"))
    }

    pub fn log_config(&self, config_id: &str) -> PathBuf {
        self.client_dir.join("log-configs").join(config_id)
    }

    pub fn mapping_compiler_jar(&self) -> PathBuf {
        self.client_dir.join("bin").join("mapping-index-compiler.jar")
    }

    pub fn mapping_temp_dir(&self, minecraft_version: &str) -> PathBuf {
        self.client_dir
            .join("tmp")
            .join(format!("mappings-index-compiler-{minecraft_version}"))
    }

    pub fn mappings_dir(&self, minecraft_version: &str) -> PathBuf {
        self.client_dir.join("mappings").join(minecraft_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_scoped_paths_include_the_version() {
        let layout = ClientLayout::new("dragonfly");

        assert_eq!(
            layout.hook_jar("1.8.9"),
            PathBuf::from("dragonfly/injection/injection-hook-1.8.9.jar")
        );
        assert_eq!(
            layout.natives_dir("1.8.9"),
            PathBuf::from("dragonfly/natives-1.8.9")
        );
        assert_ne!(
            layout.natives_extract_dir("1.8.9"),
            layout.natives_extract_dir("1.16.5")
        );
    }
}
