use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const ANIMATION_FILE: &str = "animation.mp4";

/// Scratch directory for intermediate artifacts of one run.
///
/// Removed when dropped, whether the run succeeded or not, unless
/// [`WorkDir::keep`] is called.
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("spectrovid-");
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Silent video written by the encoder before muxing.
    pub fn animation_path(&self) -> PathBuf {
        self.dir.path().join(ANIMATION_FILE)
    }

    /// Persist the directory and its contents past the end of the run.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}
