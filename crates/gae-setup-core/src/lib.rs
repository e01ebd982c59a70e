pub mod config;
pub mod error;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod cleanup;
pub mod components;
pub mod downloader;
pub mod installer;
pub mod layout;
pub mod retry;
pub mod search_path;

pub use error::SetupError;
