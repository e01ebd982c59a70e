//! libcurl transport (blocking easy interface).
//!
//! Certificate validation uses libcurl's defaults: the platform trust store,
//! peer and host verification on, no pinning.

use std::io::{self, Write};
use std::time::Duration;

use super::Transport;
use crate::config::RetryConfig;
use crate::retry::FetchError;

/// Single-stream GET over libcurl.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    /// Abort when the rate stays under 1 KiB/s for this long. `None` disables it.
    pub low_speed_time: Option<Duration>,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl CurlTransport {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_time: (cfg.low_speed_time_secs > 0)
                .then(|| Duration::from_secs(cfg.low_speed_time_secs)),
        }
    }
}

impl Transport for CurlTransport {
    fn fetch(&mut self, url: &str, sink: &mut dyn Write) -> Result<(), FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // Turn 4xx/5xx into CURLE_HTTP_RETURNED_ERROR so error pages never reach the sink.
        easy.fail_on_error(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        if let Some(t) = self.low_speed_time {
            easy.low_speed_limit(1024)?;
            easy.low_speed_time(t)?;
        }

        let mut write_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(FetchError::Storage(e));
        }
        if let Err(e) = performed {
            if e.is_http_returned_error() {
                let code = easy.response_code()?;
                return Err(FetchError::Http(code));
            }
            return Err(FetchError::Curl(e));
        }

        // 0 for non-HTTP schemes (only reachable with HTTPS enforcement off).
        let code = easy.response_code()?;
        if code != 0 && !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(())
    }
}
