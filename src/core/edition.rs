use serde::{Deserialize, Serialize};

/// A curated pairing of a Minecraft version with an optional OptiFine build
/// and the injection hook class that adapts the client to that version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    pub minecraft_version: String,
    #[serde(default)]
    pub optifine_version: Option<String>,
    pub injection_hook: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Edition {
    pub fn new(
        identifier: &str,
        minecraft_version: &str,
        optifine_version: Option<&str>,
        injection_hook: &str,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            title: identifier.to_string(),
            version: String::new(),
            minecraft_version: minecraft_version.to_string(),
            optifine_version: optifine_version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string),
            injection_hook: injection_hook.to_string(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// OptiFine build, ignoring blank values from older edition feeds.
    pub fn optifine(&self) -> Option<&str> {
        self.optifine_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Name of the installed version directory holding the game JAR,
    /// e.g. `1.8.9-OptiFine_HD_U_M5` or plain `1.8.9`.
    pub fn launch_version_name(&self) -> String {
        match self.optifine() {
            Some(optifine) => format!("{}-OptiFine_{}", self.minecraft_version, optifine),
            None => self.minecraft_version.clone(),
        }
    }
}
