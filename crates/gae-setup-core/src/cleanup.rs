//! Sweep of stale compiled-bytecode files from the working tree.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Remove every non-directory entry under `root` whose name ends with `suffix`.
///
/// Symlinks to files and dangling symlinks are removed as links, never followed.
/// Names are matched on their raw bytes, so non-UTF-8 names are swept too.
/// Any traversal or removal error aborts the sweep. Returns how many entries were removed.
pub fn remove_stale_files(root: &Path, suffix: &str) -> io::Result<usize> {
    let mut removed = 0usize;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::from)?;
        // A symlink to a directory is listed like a directory and kept.
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        if entry
            .file_name()
            .as_encoded_bytes()
            .ends_with(suffix.as_bytes())
        {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::debug!(removed, suffix, root = %root.display(), "removed stale files");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn removes_only_matching_files_recursively() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("core").join("domain");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("main.pyc"), b"").unwrap();
        fs::write(nested.join("model.pyc"), b"").unwrap();
        fs::write(nested.join("model.py"), b"").unwrap();
        fs::write(nested.join("notes.pyc.txt"), b"").unwrap();

        let removed = remove_stale_files(dir.path(), ".pyc").unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join("main.pyc").exists());
        assert!(!nested.join("model.pyc").exists());
        assert!(nested.join("model.py").exists());
        assert!(nested.join("notes.pyc.txt").exists());
    }

    #[test]
    fn directories_with_matching_names_are_kept() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("odd.pyc")).unwrap();
        assert_eq!(remove_stale_files(dir.path(), ".pyc").unwrap(), 0);
        assert!(dir.path().join("odd.pyc").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_removed_without_touching_targets() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let target = dir.path().join("real.py");
        fs::write(&target, b"x = 1\n").unwrap();
        let link = dir.path().join("linked.pyc");
        let dangling = dir.path().join("dangling.pyc");
        symlink(&target, &link).unwrap();
        symlink(dir.path().join("gone.pyc.src"), &dangling).unwrap();

        let removed = remove_stale_files(dir.path(), ".pyc").unwrap();
        assert_eq!(removed, 2);
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(fs::symlink_metadata(&dangling).is_err());
        assert!(target.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_removed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"mod\xff.pyc"));
        fs::write(&path, b"").unwrap();

        assert_eq!(remove_stale_files(dir.path(), ".pyc").unwrap(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(remove_stale_files(&dir.path().join("nope"), ".pyc").is_err());
    }
}
