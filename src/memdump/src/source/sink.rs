//! Filesystem Artifact Sink

use super::traits::ArtifactSink;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Writes artifacts with `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct FsArtifactSink;

impl ArtifactSink for FsArtifactSink {
    fn ensure_directory(&self, path: &Path) -> Result<()> {
        // create_dir_all succeeds if another task created the directory first
        fs::create_dir_all(path).map_err(|source| Error::Persist {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|source| Error::Persist {
            path: path.to_path_buf(),
            source,
        })
    }
}
