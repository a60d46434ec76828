mod layout;
mod settings;

pub use layout::ClientLayout;
pub use settings::{developer_mode_from_env, is_developer_key, LauncherConfig};
