// ─── Launch Command ───
// Builds the JVM invocation for an assembled launch.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::core::auth::LaunchAccount;
use crate::core::config::LauncherConfig;
use crate::core::edition::Edition;

use super::classpath::Classpath;

const REDACTED: &str = "<redacted>";

/// Everything resolved before the command line can be written down.
#[derive(Debug, Clone)]
pub struct AssembledLaunch {
    pub edition: Edition,
    pub java_exe: PathBuf,
    pub classpath: Classpath,
    /// Relative to the game root.
    pub natives_dir: PathBuf,
    pub assets_index: String,
    /// Relative to the game root; only set when the version declares one.
    pub log_config: Option<PathBuf>,
}

/// Legacy asset indexes read from the virtual tree.
pub fn assets_dir(minecraft_dir: &Path, assets_index: &str) -> PathBuf {
    if assets_index == "legacy" {
        minecraft_dir.join("assets").join("virtual").join("legacy")
    } else {
        minecraft_dir.join("assets")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub java_exe: PathBuf,
    pub jvm_args: Vec<String>,
    pub main_class: String,
    /// `--key value` pairs, in order.
    pub program_args: Vec<(String, String)>,
    pub working_dir: PathBuf,
    /// Relative natives directory, also exported through the loader path.
    pub natives_dir: PathBuf,
}

impl LaunchCommand {
    pub fn build(assembled: &AssembledLaunch, account: &LaunchAccount, config: &LauncherConfig) -> Self {
        let layout = config.layout();
        let edition = &assembled.edition;
        let version = edition.minecraft_version.as_str();

        let agent_args = [
            format!("-v {version}"),
            format!("-i {}", config.core_injection_class),
            format!("-i {}", edition.injection_hook),
        ]
        .join(" ");

        let mut jvm_args = vec![
            format!(
                "-javaagent:{}={}",
                layout.agent_jar().to_string_lossy(),
                agent_args
            ),
            format!(
                "-Djava.library.path={}",
                assembled.natives_dir.to_string_lossy()
            ),
        ];
        if let Some(log_config) = &assembled.log_config {
            jvm_args.push(format!(
                "-Dlog4j.configurationFile={}",
                log_config.to_string_lossy()
            ));
        }
        jvm_args.push("-cp".into());
        jvm_args.push(assembled.classpath.joined());

        let minecraft_dir = &config.minecraft_dir;
        let mut program_args = vec![
            ("version".to_string(), version.to_string()),
            (
                "assetsDir".into(),
                assets_dir(minecraft_dir, &assembled.assets_index)
                    .to_string_lossy()
                    .to_string(),
            ),
            ("assetIndex".into(), assembled.assets_index.clone()),
            ("accessToken".into(), account.access_token.clone()),
            ("uuid".into(), account.uuid.clone()),
            ("username".into(), account.username.clone()),
            ("userType".into(), config.user_type.clone()),
        ];
        if edition.optifine().is_some() {
            program_args.push(("tweakClass".into(), config.optifine_tweak_class.clone()));
        }
        program_args.push((
            "gameDir".into(),
            minecraft_dir.to_string_lossy().to_string(),
        ));

        Self {
            java_exe: assembled.java_exe.clone(),
            jvm_args,
            main_class: config.main_class.clone(),
            program_args,
            working_dir: minecraft_dir.clone(),
            natives_dir: assembled.natives_dir.clone(),
        }
    }

    /// Arguments after the executable: JVM args, main class, program args.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.jvm_args.clone();
        args.push(self.main_class.clone());
        for (key, value) in &self.program_args {
            args.push(format!("--{key}"));
            args.push(value.clone());
        }
        args
    }

    /// Copy/paste friendly rendering with the access token masked.
    pub fn to_command_line(&self) -> String {
        let mut parts = vec![shell_escape(&self.java_exe.to_string_lossy())];
        parts.extend(self.jvm_args.iter().map(|arg| shell_escape(arg)));
        parts.push(shell_escape(&self.main_class));
        for (key, value) in &self.program_args {
            parts.push(format!("--{key}"));
            if key == "accessToken" {
                parts.push(REDACTED.to_string());
            } else {
                parts.push(shell_escape(value));
            }
        }
        parts.join(" ")
    }

    /// Process builder with piped output, running in the game root.
    /// Arguments are passed as an argv vector, never through a shell.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.java_exe);
        cmd.args(self.args());
        cmd.current_dir(&self.working_dir);
        configure_native_library_env(&mut cmd, &self.working_dir.join(&self.natives_dir));
        configure_platform_spawn(&mut cmd);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        debug!("Command (copy/paste): {}", self.to_command_line());
        cmd
    }
}

fn configure_native_library_env(cmd: &mut tokio::process::Command, natives_dir: &Path) {
    let native_path = natives_dir.to_string_lossy();

    if cfg!(target_os = "windows") {
        cmd.env("PATH", append_env_path("PATH", &native_path));
    } else if cfg!(target_os = "linux") {
        cmd.env("LD_LIBRARY_PATH", append_env_path("LD_LIBRARY_PATH", &native_path));
    } else if cfg!(target_os = "macos") {
        cmd.env(
            "DYLD_LIBRARY_PATH",
            append_env_path("DYLD_LIBRARY_PATH", &native_path),
        );
    }
}

#[allow(unused_variables)]
fn configure_platform_spawn(cmd: &mut tokio::process::Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
        cmd.env_remove("WT_SESSION");
        cmd.env_remove("TERM");
        cmd.env_remove("ConEmuANSI");
    }
}

fn append_env_path(var_name: &str, value: &str) -> String {
    let separator = if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    };
    match std::env::var(var_name) {
        Ok(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, separator, existing)
        }
        _ => value.to_string(),
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=' | ';')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembled(optifine: Option<&str>, log_config: Option<&str>) -> AssembledLaunch {
        AssembledLaunch {
            edition: Edition::new("df", "1.8.9", optifine, "net.dragonfly.hook.Hook189"),
            java_exe: PathBuf::from("/jre/bin/java"),
            classpath: crate::core::launch::build_classpath(
                &serde_json::from_value(serde_json::json!({ "libraries": [] })).unwrap(),
                &Edition::new("df", "1.8.9", optifine, "net.dragonfly.hook.Hook189"),
                &LauncherConfig::with_minecraft_dir("/game"),
                Path::new("versions/1.8.9/1.8.9.jar"),
            )
            .unwrap(),
            natives_dir: PathBuf::from("dragonfly/natives-1.8.9"),
            assets_index: "1.8".into(),
            log_config: log_config.map(PathBuf::from),
        }
    }

    fn account() -> LaunchAccount {
        LaunchAccount {
            uuid: "uuid-1".into(),
            username: "Steve".into(),
            access_token: "secret-token".into(),
        }
    }

    fn keys(command: &LaunchCommand) -> Vec<&str> {
        command.program_args.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn agent_arguments_are_ordered() {
        let config = LauncherConfig::with_minecraft_dir("/game");
        let command = LaunchCommand::build(&assembled(None, None), &account(), &config);

        let agent = &command.jvm_args[0];
        assert!(agent.starts_with("-javaagent:"));
        assert!(agent.ends_with(
            "agent-shared.jar=-v 1.8.9 -i net.dragonfly.core.DragonflyCore -i net.dragonfly.hook.Hook189"
        ));
        assert_eq!(command.main_class, "net.minecraft.launchwrapper.Launch");
    }

    #[test]
    fn optifine_adds_the_tweak_class_before_game_dir() {
        let config = LauncherConfig::with_minecraft_dir("/game");
        let command = LaunchCommand::build(&assembled(Some("HD_U_M5"), None), &account(), &config);

        assert_eq!(
            keys(&command),
            vec![
                "version",
                "assetsDir",
                "assetIndex",
                "accessToken",
                "uuid",
                "username",
                "userType",
                "tweakClass",
                "gameDir"
            ]
        );
        assert_eq!(command.program_args[7].1, "optifine.OptiFineTweaker");
    }

    #[test]
    fn vanilla_has_no_tweak_class() {
        let config = LauncherConfig::with_minecraft_dir("/game");
        let command = LaunchCommand::build(&assembled(None, None), &account(), &config);
        assert!(!keys(&command).contains(&"tweakClass"));
    }

    #[test]
    fn log_config_only_when_declared() {
        let config = LauncherConfig::with_minecraft_dir("/game");
        let without = LaunchCommand::build(&assembled(None, None), &account(), &config);
        assert!(!without
            .jvm_args
            .iter()
            .any(|arg| arg.starts_with("-Dlog4j.configurationFile=")));

        let with = LaunchCommand::build(
            &assembled(None, Some("dragonfly/log-configs/client-1.7.xml")),
            &account(),
            &config,
        );
        assert!(with
            .jvm_args
            .contains(&"-Dlog4j.configurationFile=dragonfly/log-configs/client-1.7.xml".to_string()));
    }

    #[test]
    fn classpath_follows_the_cp_flag() {
        let config = LauncherConfig::with_minecraft_dir("/game");
        let command = LaunchCommand::build(&assembled(None, None), &account(), &config);
        let args = command.args();

        let cp = args.iter().position(|arg| arg == "-cp").unwrap();
        assert!(args[cp + 1].ends_with("1.8.9.jar"));
        assert_eq!(args[cp + 2], "net.minecraft.launchwrapper.Launch");
        assert_eq!(args[cp + 3], "--version");
    }

    #[test]
    fn command_line_redacts_the_access_token() {
        let config = LauncherConfig::with_minecraft_dir("/game");
        let command = LaunchCommand::build(&assembled(None, None), &account(), &config);

        let line = command.to_command_line();
        assert!(!line.contains("secret-token"));
        assert!(line.contains("--accessToken <redacted>"));
        assert!(command.args().contains(&"secret-token".to_string()));
    }

    #[test]
    fn legacy_assets_use_the_virtual_tree() {
        assert_eq!(
            assets_dir(Path::new("/game"), "legacy"),
            PathBuf::from("/game/assets/virtual/legacy")
        );
        assert_eq!(assets_dir(Path::new("/game"), "1.8"), PathBuf::from("/game/assets"));
    }

    #[test]
    fn append_env_path_prefixes_new_value() {
        let merged = append_env_path("DRAGONFLY_TEST_ENV_SHOULD_NOT_EXIST", "/tmp/natives");
        assert_eq!(merged, "/tmp/natives");

        std::env::set_var("DRAGONFLY_TEST_PATH", "C:/Windows/System32");
        let merged = append_env_path("DRAGONFLY_TEST_PATH", "C:/Game/natives");
        let expected_sep = if cfg!(target_os = "windows") {
            ";"
        } else {
            ":"
        };
        assert_eq!(
            merged,
            format!("C:/Game/natives{}C:/Windows/System32", expected_sep)
        );
        std::env::remove_var("DRAGONFLY_TEST_PATH");
    }
}
