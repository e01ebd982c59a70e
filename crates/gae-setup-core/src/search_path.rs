//! Module search path handed to the SDK tooling and to dependent scripts.
//!
//! Rather than mutating global state, the extra library locations are
//! appended to `PYTHONPATH` inside a `ProcessEnv`, which is then applied to
//! every child process the installer starts.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Variable the Python runtime reads its extra module directories from.
pub const PYTHONPATH: &str = "PYTHONPATH";

/// Environment overrides for child processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    vars: BTreeMap<OsString, OsString>,
}

impl ProcessEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the current process's value of each variable in `keys`.
    pub fn inherit<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<OsStr>,
    {
        let mut env = Self::new();
        for key in keys {
            if let Some(v) = std::env::var_os(key.as_ref()) {
                env.set(key.as_ref(), v);
            }
        }
        env
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(|v| v.as_os_str())
    }

    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Apply the overrides to `cmd`.
    pub fn apply_to(&self, cmd: &mut Command) {
        cmd.envs(self.iter());
    }
}

/// Ordered list of extra library locations.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Append the entries after whatever `PYTHONPATH` already holds in `env`.
    ///
    /// Empty components of the existing value are dropped; an empty entry would
    /// put the interpreter's working directory on the path.
    pub fn apply(&self, env: &mut ProcessEnv) -> Result<(), std::env::JoinPathsError> {
        let mut paths: Vec<PathBuf> = env
            .get(PYTHONPATH)
            .map(|v| {
                std::env::split_paths(v)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        paths.extend(self.entries.iter().cloned());
        let joined = std::env::join_paths(paths)?;
        env.set(PYTHONPATH, joined);
        Ok(())
    }

    /// `export PYTHONPATH=...` line a shell can eval.
    pub fn export_line(env: &ProcessEnv) -> Option<String> {
        env.get(PYTHONPATH)
            .map(|v| format!("export {}={}", PYTHONPATH, shell_quote(Path::new(v))))
    }
}

fn shell_quote(p: &Path) -> String {
    format!("'{}'", p.to_string_lossy().replace('\'', r"'\''"))
}
