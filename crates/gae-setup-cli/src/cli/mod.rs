//! CLI for gae-setup. Takes no options besides `--help` and `--version`.

mod setup;

use anyhow::Result;
use clap::Parser;
use gae_setup_core::config;

/// Python execution environment setup for scripts that require GAE.
#[derive(Debug, Parser)]
#[command(name = "gae-setup", version)]
#[command(
    about = "Python execution environment setup for scripts that require GAE.",
    long_about = "Downloads and unpacks the pinned Google Cloud SDK next to the \
                  repository if it is missing, then installs the App Engine \
                  components. Run from the repository root. Settings are read \
                  from ~/.config/gae-setup/config.toml (or $GAE_SETUP_CONFIG)."
)]
pub struct Cli {}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let _cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let work_dir = std::env::current_dir()?;
        setup::run_setup(cfg, &work_dir)
    }
}
