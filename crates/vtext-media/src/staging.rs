//! Staged output files.
//!
//! An encode writes to a hidden sibling of the final path and is renamed into
//! place only on success. Dropping an unpromoted `StagedOutput` deletes the
//! partial file, so failure, timeout and cancellation all leave the final
//! path untouched.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;

#[derive(Debug)]
pub struct StagedOutput {
    staged: PathBuf,
    final_path: PathBuf,
    promoted: bool,
}

impl StagedOutput {
    /// Reserve a staging path next to `final_path`, creating its directory.
    pub async fn new(final_path: impl AsRef<Path>) -> MediaResult<Self> {
        let final_path = final_path.as_ref().to_path_buf();
        let file_name = final_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MediaError::internal("output path has no file name"))?;

        let parent = final_path.parent().unwrap_or_else(|| Path::new(""));
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Keep the real extension last so FFmpeg picks the right muxer.
        let token = uuid::Uuid::new_v4().simple().to_string();
        let staged = parent.join(format!(
            ".{}.{}.partial.{}",
            stem_of(file_name),
            &token[..8],
            ext_of(file_name)
        ));

        Ok(Self {
            staged,
            final_path,
            promoted: false,
        })
    }

    /// Path the encoder should write to.
    pub fn path(&self) -> &Path {
        &self.staged
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Move the finished file to the final path.
    pub async fn promote(mut self) -> MediaResult<PathBuf> {
        if !self.staged.exists() {
            return Err(MediaError::internal(format!(
                "encoder produced no file at {}",
                self.staged.display()
            )));
        }
        move_file(&self.staged, &self.final_path).await?;
        self.promoted = true;
        debug!(output = %self.final_path.display(), "Promoted staged output");
        Ok(self.final_path.clone())
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if self.promoted {
            return;
        }
        match std::fs::remove_file(&self.staged) {
            Ok(()) => debug!(staged = %self.staged.display(), "Discarded partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                staged = %self.staged.display(),
                error = %e,
                "Failed to discard partial output"
            ),
        }
    }
}

fn stem_of(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

fn ext_of(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("mp4")
}
