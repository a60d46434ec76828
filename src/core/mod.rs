// ─── Dragonfly Launcher Core ───
// Launch pipeline for Dragonfly editions of Minecraft.
//
// Architecture:
//   core/
//     config/     launcher settings + client directory layout
//     edition     curated Minecraft/OptiFine/hook pairing
//     auth/       account capability used by the pipeline
//     version/    installed version lookup + version JSON + OS rules
//     maven/      artifact coordinates
//     downloader/ streamed whole-file downloads with SHA-1 validation
//     sync        client file synchronization against the files API
//     natives     version-scoped native library staging
//     java/       Java runtime resolution and provisioning
//     launch/     classpath, command line, spawn, output supervision
//     logs/       log4j XML stream parser + message decoration
//     registry    running games
//     sink        display boundary for output and lifecycle events
//     launcher    the pipeline itself

pub mod archive;
pub mod auth;
pub mod config;
pub mod downloader;
pub mod edition;
pub mod error;
pub mod http;
pub mod java;
pub mod launch;
pub mod launcher;
pub mod logs;
pub mod maven;
pub mod natives;
pub mod registry;
pub mod sink;
pub mod sync;
pub mod version;
