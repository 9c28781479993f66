//! core::fsio
//!
//! Crash-safe file writes.
//!
//! [`write_atomic`] writes to a uniquely named temporary file in the
//! destination's directory, syncs it, then renames it over the destination.
//! Readers see either the old file or the complete new one, never a torn
//! write. The temporary file is removed if any step fails.
//!
//! Writers that must replace several files together stage each one with
//! [`stage`] first and only [`StagedFile::commit`] once every write has
//! succeeded. A staged file that is dropped uncommitted is deleted.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Write `bytes` to `path` atomically.
///
/// The parent directory must already exist.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    stage(path, bytes)?.commit()
}

/// A fully written and synced temporary file waiting to replace its target.
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

/// Write `bytes` next to `path` without touching `path` itself.
pub fn stage(path: &Path, bytes: &[u8]) -> io::Result<StagedFile> {
    let temp = temp_path_for(path)?;
    if let Err(e) = write_and_sync(&temp, bytes) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(StagedFile {
        temp,
        target: path.to_path_buf(),
        committed: false,
    })
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temporary file over the target.
    pub fn commit(mut self) -> io::Result<()> {
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Temporary sibling of `path`: `.<name>.<uuid>.tmp` in the same directory.
fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' has no file name", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(dir.join(format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        Uuid::new_v4().simple()
    )))
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
