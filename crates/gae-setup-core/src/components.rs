//! `gcloud components install` step.
//!
//! The exit status is reported as a three-way outcome; what counts as fatal is
//! decided by the configured `Strictness`, not by the runner.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::ComponentsConfig;
use crate::search_path::ProcessEnv;

/// How a non-zero gcloud exit is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Non-fatal, logged at debug level only.
    #[default]
    Ignore,
    /// Non-fatal, logged as a warning.
    Warn,
    /// Fatal.
    Strict,
}

/// Result of running the component installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Success,
    /// Installer failed but the run continues. `code` is `None` when killed by a signal.
    NonFatalFailure { code: Option<i32> },
    /// Installer failed and the run must abort.
    FatalFailure { code: Option<i32> },
}

impl InstallOutcome {
    pub fn from_exit(code: Option<i32>, strictness: Strictness) -> Self {
        if code == Some(0) {
            return InstallOutcome::Success;
        }
        match strictness {
            Strictness::Ignore | Strictness::Warn => InstallOutcome::NonFatalFailure { code },
            Strictness::Strict => InstallOutcome::FatalFailure { code },
        }
    }
}

/// A fully-specified invocation of the SDK's package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: ProcessEnv,
}

impl ComponentCommand {
    /// `<gcloud> components install <names...> <extra_args...>`
    pub fn install(gcloud: PathBuf, cfg: &ComponentsConfig, env: ProcessEnv) -> Self {
        let mut args = vec!["components".to_string(), "install".to_string()];
        args.extend(cfg.names.iter().cloned());
        args.extend(cfg.extra_args.iter().cloned());
        Self {
            program: gcloud,
            args,
            env,
        }
    }
}

/// Runs a command to completion and reports its exit code.
pub trait ComponentRunner {
    /// `Err` only when the process could not be started or waited on.
    fn run(&mut self, cmd: &ComponentCommand) -> io::Result<Option<i32>>;
}

impl<T: ComponentRunner + ?Sized> ComponentRunner for &mut T {
    fn run(&mut self, cmd: &ComponentCommand) -> io::Result<Option<i32>> {
        (**self).run(cmd)
    }
}

/// Spawns the real process, inheriting stdin/stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ComponentRunner for SystemRunner {
    fn run(&mut self, cmd: &ComponentCommand) -> io::Result<Option<i32>> {
        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd.env.apply_to(&mut command);
        let status = command.status()?;
        Ok(status.code())
    }
}

/// Run `cmd` and classify the exit according to `strictness`.
pub fn install_components<R: ComponentRunner>(
    runner: &mut R,
    cmd: &ComponentCommand,
    strictness: Strictness,
) -> io::Result<InstallOutcome> {
    tracing::debug!(program = %cmd.program.display(), args = ?cmd.args, "installing components");
    let code = runner.run(cmd)?;
    let outcome = InstallOutcome::from_exit(code, strictness);
    match outcome {
        InstallOutcome::Success => tracing::debug!("component install finished"),
        InstallOutcome::NonFatalFailure { code } => match strictness {
            Strictness::Warn => {
                tracing::warn!(?code, "component install failed; continuing")
            }
            _ => tracing::debug!(?code, "component install failed; ignored"),
        },
        InstallOutcome::FatalFailure { code } => {
            tracing::error!(?code, "component install failed")
        }
    }
    Ok(outcome)
}
