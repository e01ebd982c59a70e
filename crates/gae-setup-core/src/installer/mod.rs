//! Installation run: search path, bytecode sweep, SDK presence check,
//! download + extract when missing, then the component install.

mod transaction;

pub use transaction::InstallTransaction;

use std::fs;
use std::path::Path;

use crate::archive;
use crate::checksum;
use crate::cleanup;
use crate::components::{self, ComponentCommand, ComponentRunner, InstallOutcome, SystemRunner};
use crate::config::SetupConfig;
use crate::downloader::{url_retrieve, CurlTransport, DownloadOptions, Transport};
use crate::error::{Result, SetupError};
use crate::layout::SdkLayout;
use crate::search_path::{ProcessEnv, SearchPath, PYTHONPATH};

/// What a run did.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// The SDK was missing and has been downloaded and extracted.
    pub downloaded: bool,
    /// Stale bytecode files removed from the working tree.
    pub stale_removed: usize,
    pub components: InstallOutcome,
    /// Environment handed to the component installer (includes `PYTHONPATH`).
    pub env: ProcessEnv,
}

pub struct Installer<T, R> {
    cfg: SetupConfig,
    layout: SdkLayout,
    transport: T,
    runner: R,
}

impl Installer<CurlTransport, SystemRunner> {
    /// Installer using libcurl and real subprocesses, rooted at `work_dir`.
    pub fn system(cfg: SetupConfig, work_dir: &Path) -> Self {
        let layout = SdkLayout::new(work_dir, &cfg.sdk);
        let transport = CurlTransport::from_config(&cfg.retry);
        Installer::new(cfg, layout, transport, SystemRunner)
    }
}

impl<T: Transport, R: ComponentRunner> Installer<T, R> {
    pub fn new(cfg: SetupConfig, layout: SdkLayout, transport: T, runner: R) -> Self {
        Self {
            cfg,
            layout,
            transport,
            runner,
        }
    }

    pub fn layout(&self) -> &SdkLayout {
        &self.layout
    }

    /// Run every step in order. Any error aborts the remaining steps.
    pub fn run(&mut self) -> Result<InstallReport> {
        let env = self.prepare_env()?;
        let stale_removed = self.sweep_stale_files()?;

        tracing::info!(
            "Checking whether google-cloud-sdk is installed in {}",
            self.layout.sdk_home.display()
        );
        let downloaded = if self.layout.is_installed() {
            tracing::debug!("google-cloud-sdk already present; skipping download");
            false
        } else {
            self.install_sdk()?;
            true
        };

        let components = self.install_components(env.clone())?;
        Ok(InstallReport {
            downloaded,
            stale_removed,
            components,
            env,
        })
    }

    /// Inherit `PYTHONPATH` and append the working directory and the App Engine SDK.
    pub fn prepare_env(&self) -> Result<ProcessEnv> {
        let mut env = ProcessEnv::inherit([PYTHONPATH]);
        SearchPath::new(self.layout.library_paths())
            .apply(&mut env)
            .map_err(|e| SetupError::Config(format!("invalid search path entry: {}", e)))?;
        Ok(env)
    }

    pub fn sweep_stale_files(&self) -> Result<usize> {
        let suffix = &self.cfg.install.stale_suffix;
        cleanup::remove_stale_files(&self.layout.work_dir, suffix)
            .map_err(|e| SetupError::io(format!("failed to remove stale {} files", suffix), e))
    }

    /// Create the SDK directory, download, verify, extract, and remove the archive.
    ///
    /// Runs inside an `InstallTransaction`: on failure the directories created
    /// here and the temp archive are removed unless `install.keep_partial` is set.
    pub fn install_sdk(&mut self) -> Result<()> {
        let layout = &self.layout;
        let archive_path = layout.archive_path.as_path();
        tracing::info!("Downloading Google Cloud SDK (this may take a little while)...");

        let mut tx = InstallTransaction::new(self.cfg.install.keep_partial);
        tx.create_dir_all(&layout.sdk_home).map_err(|e| {
            SetupError::io(format!("failed to create {}", layout.sdk_home.display()), e)
        })?;
        tx.track_file(archive_path);

        let url = self.cfg.sdk.download_url();
        let opts = DownloadOptions {
            policy: self.cfg.retry.policy(),
            enforce_https: self.cfg.retry.enforce_https,
        };
        if let Err(source) = url_retrieve(&url, archive_path, &opts, &mut self.transport) {
            tracing::error!("Error downloading Google Cloud SDK. Exiting.");
            return Err(SetupError::DownloadFailed { source });
        }
        tracing::info!("Download complete. Installing Google Cloud SDK...");

        if let Some(expected) = &self.cfg.sdk.sha256 {
            let actual = checksum::sha256_file(archive_path).map_err(|e| {
                SetupError::io(format!("failed to hash {}", archive_path.display()), e)
            })?;
            if !checksum::digest_matches(expected, &actual) {
                return Err(SetupError::ChecksumMismatch {
                    path: archive_path.to_path_buf(),
                    expected: expected.clone(),
                    actual,
                });
            }
            tracing::debug!(sha256 = %actual, "archive checksum verified");
        }

        archive::extract_tar_gz(archive_path, &layout.extract_dir).map_err(|source| {
            SetupError::Extract {
                archive: archive_path.to_path_buf(),
                dest: layout.extract_dir.clone(),
                source,
            }
        })?;
        fs::remove_file(archive_path).map_err(|e| {
            SetupError::io(format!("failed to remove {}", archive_path.display()), e)
        })?;

        tx.commit();
        Ok(())
    }

    /// Run `gcloud components install ...`; a fatal outcome becomes an error.
    pub fn install_components(&mut self, env: ProcessEnv) -> Result<InstallOutcome> {
        let cmd = ComponentCommand::install(self.layout.gcloud.clone(), &self.cfg.components, env);
        let outcome =
            components::install_components(&mut self.runner, &cmd, self.cfg.components.strictness)
                .map_err(|source| SetupError::ComponentInstall {
                    program: cmd.program.clone(),
                    source,
                })?;
        if let InstallOutcome::FatalFailure { code } = outcome {
            return Err(SetupError::ComponentsFailed { code });
        }
        Ok(outcome)
    }
}
