//! Error types for memory acquisition

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while enumerating, capturing or persisting process memory
#[derive(Debug, Error)]
pub enum Error {
    #[error("Process enumeration failed: {0}")]
    Enumeration(String),

    #[error("Cannot open process {pid}: {reason}")]
    Open { pid: u32, reason: String },

    #[error("Region query failed at {address:#x}")]
    Query { address: usize },

    #[error("Failed to read {size} bytes at {address:#x}")]
    Read { address: usize, size: usize },

    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid region type '{0}' (expected all, heap or stack)")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
