//! Cumulative follower count persisted between runs.

use std::path::{Path, PathBuf};

use crate::foundation::error::{RevealError, RevealResult};

/// Plain-text counter file keyed by the source image's file name (`<name>.state`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCounter {
    path: PathBuf,
}

impl SessionCounter {
    /// Counter for `source_image`, stored under `state_dir`.
    pub fn for_source(state_dir: &Path, source_image: &Path) -> RevealResult<Self> {
        let name = source_image.file_name().ok_or_else(|| {
            RevealError::validation(format!(
                "source image '{}' has no file name",
                source_image.display()
            ))
        })?;
        let mut file = name.to_os_string();
        file.push(".state");
        Ok(Self {
            path: state_dir.join(file),
        })
    }

    /// Counter stored at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the counter file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Previous total; a missing or unreadable file counts as zero.
    pub fn load(&self) -> u64 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read follower state, starting from 0");
                return 0;
            }
        };
        match text.trim().parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    content = text.trim(),
                    "follower state is not a non-negative integer, starting from 0"
                );
                0
            }
        }
    }

    /// Overwrite the file with `total`.
    pub fn save(&self, total: u64) -> RevealResult<()> {
        std::fs::write(&self.path, total.to_string()).map_err(|e| {
            RevealError::state(format!(
                "write follower state '{}': {e}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
