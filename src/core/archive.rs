// ─── Archive helpers ───
// Blocking zip/tree operations; async callers wrap them in `spawn_blocking`.

use std::path::Path;

use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

/// Unpack every entry of `zip_path` below `destination`. Entries whose names
/// would escape the destination are skipped.
pub fn extract_zip_file(zip_path: &Path, destination: &Path) -> LauncherResult<()> {
    let zip_file = std::fs::File::open(zip_path).map_err(|source| LauncherError::Io {
        path: zip_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(zip_file)?;

    for index in 0..archive.len() {
        let mut zipped = archive.by_index(index)?;
        let Some(rel_path) = zipped.enclosed_name() else {
            warn!("Skipping unsafe zip entry {:?} in {:?}", zipped.name(), zip_path);
            continue;
        };

        let out_path = destination.join(rel_path);
        if zipped.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| LauncherError::Io {
                path: out_path,
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = std::fs::File::create(&out_path).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut zipped, &mut out).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;

        #[cfg(unix)]
        if let Some(mode) = zipped.unix_mode().filter(|mode| mode & 0o400 != 0) {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode));
        }
    }

    Ok(())
}

pub async fn extract_zip_async(zip_path: &Path, destination: &Path) -> LauncherResult<()> {
    let archive = zip_path.to_path_buf();
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || extract_zip_file(&archive, &destination))
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {e}")))?
}

pub fn copy_dir_recursive(source: &Path, destination: &Path) -> LauncherResult<()> {
    std::fs::create_dir_all(destination).map_err(|source_err| LauncherError::Io {
        path: destination.to_path_buf(),
        source: source_err,
    })?;

    for entry in std::fs::read_dir(source).map_err(|source_err| LauncherError::Io {
        path: source.to_path_buf(),
        source: source_err,
    })? {
        let entry = entry.map_err(|source_err| LauncherError::Io {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|source_err| LauncherError::Io {
            path: src_path.clone(),
            source: source_err,
        })?;

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            std::fs::copy(&src_path, &dst_path).map_err(|source_err| LauncherError::Io {
                path: dst_path,
                source: source_err,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn extracts_nested_entries() {
        let temp = tempfile::tempdir().unwrap();
        let zip_path = temp.path().join("a.zip");
        {
            let mut zip = zip::ZipWriter::new(std::fs::File::create(&zip_path).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            zip.add_directory("lib/", options).unwrap();
            zip.start_file("lib/native.dll", options).unwrap();
            zip.write_all(b"dll").unwrap();
            zip.finish().unwrap();
        }

        let out = temp.path().join("out");
        extract_zip_file(&zip_path, &out).unwrap();

        assert_eq!(std::fs::read(out.join("lib/native.dll")).unwrap(), b"dll");
    }

    #[test]
    fn copies_trees() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("nested/file.txt"), b"x").unwrap();

        copy_dir_recursive(&src, &temp.path().join("dst")).unwrap();
        assert_eq!(
            std::fs::read(temp.path().join("dst/nested/file.txt")).unwrap(),
            b"x"
        );
    }
}
