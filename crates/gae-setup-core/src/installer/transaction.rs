//! Scoped install transaction: paths created during a failed install are removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tracks what an install created so a failure can undo it.
///
/// Dropping an uncommitted transaction removes the tracked paths unless it
/// was opened with `keep_partial`.
#[derive(Debug)]
pub struct InstallTransaction {
    created_dir: Option<PathBuf>,
    files: Vec<PathBuf>,
    keep_partial: bool,
    committed: bool,
}

impl InstallTransaction {
    pub fn new(keep_partial: bool) -> Self {
        Self {
            created_dir: None,
            files: Vec::new(),
            keep_partial,
            committed: false,
        }
    }

    /// `create_dir_all(dir)`, remembering the outermost directory that did not exist before.
    pub fn create_dir_all(&mut self, dir: &Path) -> io::Result<()> {
        let outermost = dir
            .ancestors()
            .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
            .last()
            .map(Path::to_path_buf);
        fs::create_dir_all(dir)?;
        if self.created_dir.is_none() {
            self.created_dir = outermost;
        }
        Ok(())
    }

    /// Remove `file` on rollback as well.
    pub fn track_file(&mut self, file: &Path) {
        self.files.push(file.to_path_buf());
    }

    /// Keep everything; nothing is removed on drop.
    pub fn commit(mut self) {
        self.committed = true;
    }

    fn rollback(&mut self) {
        for file in self.files.drain(..) {
            if let Err(e) = fs::remove_file(&file) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %file.display(), "rollback: failed to remove file: {}", e);
                }
            }
        }
        if let Some(dir) = self.created_dir.take() {
            match fs::remove_dir_all(&dir) {
                Ok(()) => tracing::info!("removed partial install at {}", dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %dir.display(), "rollback: failed to remove directory: {}", e)
                }
            }
        }
    }
}

impl Drop for InstallTransaction {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if self.keep_partial {
            if let Some(dir) = &self.created_dir {
                tracing::debug!("leaving partial install at {}", dir.display());
            }
            return;
        }
        self.rollback();
    }
}
