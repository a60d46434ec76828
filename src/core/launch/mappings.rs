// ─── Mapping Index Compiler ───
// Runs the bundled mapping compiler before launch. Failures never abort the
// launch; the client falls back to its previous mappings.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::core::config::LauncherConfig;

/// Returns whether the compiler ran and exited successfully.
pub async fn compile_mappings(java_exe: &Path, config: &LauncherConfig, version: &str) -> bool {
    let layout = config.layout();
    let compiler = layout.mapping_compiler_jar();
    if !config.minecraft_dir.join(&compiler).is_file() {
        debug!("No mapping compiler at {:?}, skipping", compiler);
        return false;
    }

    info!("Compiling mappings for {}", version);
    let mut cmd = tokio::process::Command::new(java_exe);
    cmd.arg("-jar")
        .arg(&compiler)
        .arg("--version")
        .arg(version)
        .arg("--temp-dir")
        .arg(layout.mapping_temp_dir(version))
        .arg("--destination-dir")
        .arg(layout.mappings_dir(version))
        .current_dir(&config.minecraft_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!("Could not start the mapping compiler: {}", err);
            return false;
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::join!(
        forward_lines(stdout.map(BufReader::new), false),
        forward_lines(stderr.map(BufReader::new), true),
    );

    match child.wait().await {
        Ok(status) if status.success() => {
            info!("Mappings compiled");
            true
        }
        Ok(status) => {
            warn!("Mapping compiler exited with {}", status);
            false
        }
        Err(err) => {
            warn!("Mapping compiler failed: {}", err);
            false
        }
    }
}

async fn forward_lines<R: AsyncBufRead + Unpin>(reader: Option<R>, is_stderr: bool) {
    let Some(reader) = reader else {
        return;
    };
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!(target: "mappings", "{}", line);
        } else {
            debug!(target: "mappings", "{}", line);
        }
    }
}
