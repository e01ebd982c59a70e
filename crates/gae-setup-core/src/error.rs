//! Error type for the installation run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::downloader::DownloadError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Error downloading Google Cloud SDK.")]
    DownloadFailed {
        #[source]
        source: DownloadError,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to extract {archive} into {dest}")]
    Extract {
        archive: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start {program}")]
    ComponentInstall {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("component install exited with {}", describe_code(.code))]
    ComponentsFailed { code: Option<i32> },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

impl SetupError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        SetupError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = SetupError> = std::result::Result<T, E>;
