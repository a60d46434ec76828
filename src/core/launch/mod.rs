mod classpath;
mod command;
mod mappings;
mod process;
mod state;
mod supervisor;

pub use classpath::{build_classpath, classpath_separator, Classpath};
pub use command::{assets_dir, AssembledLaunch, LaunchCommand};
pub use mappings::compile_mappings;
pub use process::{spawn_game, SpawnedGame};
pub use state::{LaunchOptions, LaunchState, StatusCallback};
pub use supervisor::{GameExit, Supervisor};
