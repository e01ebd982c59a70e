//! Retrying secure downloader.
//!
//! Fetches one URL into one destination file. The URL scheme is checked before
//! anything touches the network or the filesystem; transport failures are
//! retried up to the policy's attempt budget, local write failures are not.

mod curl_transport;

pub use curl_transport::CurlTransport;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// Scheme prefix required when HTTPS is enforced.
pub const HTTPS_PREFIX: &str = "https://";

/// One network fetch. Implementations write the full body into `sink`.
///
/// A failure to write into `sink` must be reported as `FetchError::Storage`
/// so it is not mistaken for a transport failure.
pub trait Transport {
    fn fetch(&mut self, url: &str, sink: &mut dyn Write) -> Result<(), FetchError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn fetch(&mut self, url: &str, sink: &mut dyn Write) -> Result<(), FetchError> {
        (**self).fetch(url, sink)
    }
}

/// Options for `url_retrieve`.
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    pub policy: RetryPolicy,
    /// Refuse URLs that do not start with `https://`.
    pub enforce_https: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            enforce_https: true,
        }
    }
}

/// Why a download did not complete.
#[derive(Debug)]
pub enum DownloadError {
    /// HTTPS is enforced and the URL uses another scheme. Never retried.
    InsecureUrl { url: String },
    /// The URL could not be parsed. Never retried.
    InvalidUrl { url: String, reason: url::ParseError },
    /// The destination could not be created or written. Never retried.
    Storage(std::io::Error),
    /// Every allowed attempt failed; `source` is the last attempt's error.
    Transport { attempts: u32, source: FetchError },
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::InsecureUrl { url } => {
                write!(f, "The URL {} should use HTTPS.", url)
            }
            DownloadError::InvalidUrl { url, reason } => {
                write!(f, "invalid URL {}: {}", url, reason)
            }
            DownloadError::Storage(e) => write!(f, "failed to write download: {}", e),
            DownloadError::Transport { attempts, source } => {
                write!(f, "download failed after {} attempt(s): {}", attempts, source)
            }
        }
    }
}

impl std::error::Error for DownloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DownloadError::InvalidUrl { reason, .. } => Some(reason),
            DownloadError::Storage(e) => Some(e),
            DownloadError::Transport { source, .. } => Some(source),
            DownloadError::InsecureUrl { .. } => None,
        }
    }
}

/// Checks the URL before any attempt is made.
pub fn validate_url(url: &str, enforce_https: bool) -> Result<(), DownloadError> {
    if enforce_https && !url.starts_with(HTTPS_PREFIX) {
        return Err(DownloadError::InsecureUrl {
            url: url.to_string(),
        });
    }
    url::Url::parse(url).map_err(|reason| DownloadError::InvalidUrl {
        url: url.to_string(),
        reason,
    })?;
    Ok(())
}

/// Retrieves `url` into `output_path`, retrying transport failures.
///
/// Each attempt truncates `output_path` first, so the file only ever holds the
/// body of the latest attempt. Returns the number of attempts used.
pub fn url_retrieve<T: Transport>(
    url: &str,
    output_path: &Path,
    opts: &DownloadOptions,
    mut transport: T,
) -> Result<u32, DownloadError> {
    validate_url(url, opts.enforce_https)?;

    let result = run_with_retry(&opts.policy, url, || {
        let file = File::create(output_path).map_err(FetchError::Storage)?;
        let mut writer = BufWriter::new(file);
        transport.fetch(url, &mut writer)?;
        writer.flush().map_err(FetchError::Storage)?;
        Ok(())
    });

    match result {
        Ok(attempts) => {
            tracing::debug!(url, attempts, path = %output_path.display(), "download complete");
            Ok(attempts)
        }
        Err(failure) => match failure.error {
            FetchError::Storage(e) => Err(DownloadError::Storage(e)),
            source => Err(DownloadError::Transport {
                attempts: failure.attempts,
                source,
            }),
        },
    }
}
