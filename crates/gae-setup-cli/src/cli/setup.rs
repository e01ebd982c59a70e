//! The setup run: provision the SDK and print the search path for callers.

use anyhow::Result;
use gae_setup_core::components::InstallOutcome;
use gae_setup_core::config::SetupConfig;
use gae_setup_core::installer::Installer;
use gae_setup_core::search_path::SearchPath;
use std::path::Path;

pub fn run_setup(cfg: SetupConfig, work_dir: &Path) -> Result<()> {
    let mut installer = Installer::system(cfg, work_dir);
    tracing::debug!(layout = ?installer.layout(), "resolved SDK layout");
    let report = installer.run()?;

    if let InstallOutcome::NonFatalFailure { code } = report.components {
        tracing::debug!(?code, "continuing despite component install failure");
    }
    if let Some(line) = SearchPath::export_line(&report.env) {
        println!("{}", line);
    }
    Ok(())
}
