//! Filesystem layout of a versioned SDK install, derived from the working directory.

use std::path::{Path, PathBuf};

use crate::config::SdkConfig;

/// Name of the directory the SDK tarball unpacks into.
pub const SDK_DIR_NAME: &str = "google-cloud-sdk";

/// Resolved paths for one SDK version.
///
/// The tool is expected to run from the repository root, with the tools
/// directory sitting next to it (`<cwd>/../<tools_dir_name>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLayout {
    /// Working directory the tool was started from.
    pub work_dir: PathBuf,
    /// `<cwd>/../<tools_dir_name>`
    pub tools_dir: PathBuf,
    /// `<tools>/google-cloud-sdk-<version>`; the archive is extracted here.
    pub extract_dir: PathBuf,
    /// `<extract>/google-cloud-sdk`; its existence marks the SDK as installed.
    pub sdk_home: PathBuf,
    /// `<sdk>/platform/google_appengine`
    pub app_engine_home: PathBuf,
    /// `<sdk>/bin/gcloud`
    pub gcloud: PathBuf,
    /// `<cwd>/<archive_name>`
    pub archive_path: PathBuf,
}

impl SdkLayout {
    pub fn new(work_dir: &Path, sdk: &SdkConfig) -> Self {
        let parent = work_dir.parent().unwrap_or(work_dir);
        let tools_dir = parent.join(&sdk.tools_dir_name);
        let extract_dir = tools_dir.join(format!("{}-{}", SDK_DIR_NAME, sdk.version));
        let sdk_home = extract_dir.join(SDK_DIR_NAME);
        Self {
            work_dir: work_dir.to_path_buf(),
            app_engine_home: sdk_home.join("platform").join("google_appengine"),
            gcloud: sdk_home.join("bin").join("gcloud"),
            archive_path: work_dir.join(&sdk.archive_name),
            tools_dir,
            extract_dir,
            sdk_home,
        }
    }

    /// Whether the SDK counts as installed. Presence is the only check.
    pub fn is_installed(&self) -> bool {
        self.sdk_home.exists()
    }

    /// Library locations appended to the module search path, in order.
    pub fn library_paths(&self) -> Vec<PathBuf> {
        vec![PathBuf::from("."), self.app_engine_home.clone()]
    }
}
