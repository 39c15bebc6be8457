//! One build per case directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::{CaseError, CaseResult};

/// Exclusive build lock for a case directory.
///
/// The lock file sits next to the case (`<case>.fcb.lock`) so that the
/// wholesale removal of the case directory during creation leaves it alone.
/// It is removed on drop.
#[derive(Debug)]
pub struct CaseLock {
    path: PathBuf,
}

impl CaseLock {
    pub fn lock_path(case_dir: &Path) -> PathBuf {
        let mut name = case_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".fcb.lock");
        case_dir.with_file_name(name)
    }

    pub fn acquire(case_dir: &Path) -> CaseResult<Self> {
        Self::acquire_with(case_dir, |file| writeln!(file, "{}", std::process::id()))
    }

    /// Claim the lock file, then let `stamp` fill it. The file is removed
    /// again if `stamp` fails.
    fn acquire_with(
        case_dir: &Path,
        stamp: impl FnOnce(&mut fs::File) -> io::Result<()>,
    ) -> CaseResult<Self> {
        let path = Self::lock_path(case_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(CaseError::Locked {
                    path: case_dir.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let lock = Self { path };
        stamp(&mut file)?;
        tracing::debug!(lock = %lock.path.display(), "case lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CaseLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release case lock");
        }
    }
}
