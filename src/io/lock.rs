//! Lock file management for single-instance enforcement.
//!
//! Two controllers driving the same player would fight over it, so startup
//! takes an exclusive advisory lock on `$XDG_RUNTIME_DIR/lullaby.lock`
//! (falling back to `/tmp`). The lock belongs to the open file, so it goes
//! away with the process even after a crash and a leftover file never blocks
//! the next start.

use anyhow::{Context, Result, bail};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;
use crate::common::utils::private_path;

/// Held lock. Dropping it releases the lock and removes the file.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    /// Take the lock at `path`, recording our PID in it.
    ///
    /// Fails when another live process holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        // Open without truncating so a running holder's PID stays readable
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", private_path(path)))?;

        if file.try_lock_exclusive().is_err() {
            match holder_pid(path) {
                Some(pid) => bail!("lullaby is already running (PID: {pid})"),
                None => bail!("lullaby is already running"),
            }
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

/// Default lock location for this user.
pub fn default_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

fn holder_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_writes_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let lock = LockFile::acquire(&path).unwrap();
        assert_eq!(lock.path(), path);
        assert_eq!(holder_pid(&path), Some(std::process::id()));
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let _held = LockFile::acquire(&path).unwrap();
        let err = LockFile::acquire(&path).unwrap_err().to_string();
        assert!(err.contains("already running"), "{err}");
        assert!(err.contains(&std::process::id().to_string()), "{err}");
    }

    #[test]
    fn test_drop_releases_and_removes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        drop(LockFile::acquire(&path).unwrap());
        assert!(!path.exists());
        assert!(LockFile::acquire(&path).is_ok());
    }

    #[test]
    fn test_leftover_file_does_not_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        std::fs::write(&path, "99999\n").unwrap();

        assert!(LockFile::acquire(&path).is_ok());
    }
}
