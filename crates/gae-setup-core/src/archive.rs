//! Extraction of the gzip-compressed SDK tarball.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path};

/// Extract a `.tar.gz` file into `dest_dir`, creating it if needed.
///
/// Entry paths are kept as-is (no prefix stripping). Absolute paths and
/// entries containing `..` are rejected. Returns the number of entries written.
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> io::Result<usize> {
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    extract_tar(decoder, dest_dir)
}

/// Extract a tar stream into `dest_dir`.
pub fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> io::Result<usize> {
    fs::create_dir_all(dest_dir)?;
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    let mut count = 0usize;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("archive entry escapes destination: {}", path.display()),
            ));
        }
        // unpack_in refuses anything that would land outside dest_dir (symlink tricks included).
        if entry.unpack_in(dest_dir)? {
            count += 1;
        }
    }
    tracing::debug!(entries = count, dest = %dest_dir.display(), "archive extracted");
    Ok(count)
}
