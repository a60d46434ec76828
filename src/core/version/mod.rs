mod installed;
mod version_file;

pub use installed::{load_manifest, locate_version, InstalledVersion};
pub use version_file::{
    current_os_name, LibraryArtifact, LibraryDownloads, LibraryEntry, LibraryRule, LibrarySource,
    OsRule, RuleAction, VersionManifest,
};
