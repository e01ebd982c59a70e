use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::components::Strictness;
use crate::retry::RetryPolicy;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "GAE_SETUP_CONFIG";

/// Which SDK to fetch and where to put it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// SDK release, e.g. "364.0.0". Also names the versioned install directory.
    pub version: String,
    /// Platform triple used in the archive name, e.g. "linux-x86_64".
    pub platform: String,
    /// Download URL with `{version}` and `{platform}` placeholders.
    pub url_template: String,
    /// Tools directory name, resolved relative to the working directory's parent.
    pub tools_dir_name: String,
    /// Temporary archive file name, resolved relative to the working directory.
    pub archive_name: String,
    /// Expected SHA-256 of the archive (lowercase hex). Skipped when absent.
    pub sha256: Option<String>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            version: "364.0.0".to_string(),
            platform: "linux-x86_64".to_string(),
            url_template: "https://dl.google.com/dl/cloudsdk/channels/rapid/downloads/\
                           google-cloud-sdk-{version}-{platform}.tar.gz"
                .to_string(),
            tools_dir_name: "oppia_tools".to_string(),
            archive_name: "gcloud-sdk.tar.gz".to_string(),
            sha256: None,
        }
    }
}

impl SdkConfig {
    /// Render `url_template` for the configured version and platform.
    pub fn download_url(&self) -> String {
        self.url_template
            .replace("{version}", &self.version)
            .replace("{platform}", &self.platform)
    }
}

/// Download retry parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Refuse any URL that does not start with `https://`.
    pub enforce_https: bool,
    /// Base delay in seconds for exponential backoff (0 = retry immediately).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Connect timeout in seconds for each attempt.
    pub connect_timeout_secs: u64,
    /// Abort an attempt whose transfer stays below 1 KiB/s for this many seconds (0 = never).
    pub low_speed_time_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            enforce_https: true,
            base_delay_secs: 0.0,
            max_delay_secs: 30,
            connect_timeout_secs: 30,
            low_speed_time_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Component installation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Components passed to `gcloud components install`.
    pub names: Vec<String>,
    /// Extra arguments appended after the component names.
    pub extra_args: Vec<String>,
    /// How a non-zero exit from gcloud is treated.
    pub strictness: Strictness,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            names: vec![
                "beta".to_string(),
                "cloud-datastore-emulator".to_string(),
                "app-engine-python".to_string(),
                "app-engine-python-extras".to_string(),
            ],
            extra_args: vec!["--quiet".to_string()],
            strictness: Strictness::default(),
        }
    }
}

/// Behaviour of the install transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Leave created directories and the temp archive behind when installation fails.
    pub keep_partial: bool,
    /// File suffix swept from the working tree before installing.
    pub stale_suffix: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            keep_partial: false,
            stale_suffix: ".pyc".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/gae-setup/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupConfig {
    #[serde(default)]
    pub sdk: SdkConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub components: ComponentsConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

pub fn config_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gae-setup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SetupConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SetupConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SetupConfig = toml::from_str(&data)?;
    Ok(cfg)
}
