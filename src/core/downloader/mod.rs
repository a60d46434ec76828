mod client;

pub use client::{sha1_bytes, sha1_file, Downloader};
