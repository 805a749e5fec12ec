//! Host Capability Traits
//!
//! The engine never talks to the operating system directly. Process
//! enumeration, region queries, reads and artifact writes all go through
//! these traits so captures can run against live processes or mocks.

use crate::error::Result;
use crate::region::RegionDescriptor;
use std::ops::Range;
use std::path::Path;

/// A matched process, produced by a [`ProcessDirectory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTarget {
    pub pid: u32,
    pub name: String,
}

impl ProcessTarget {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ProcessTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.pid)
    }
}

/// Point-in-time list of running processes
pub trait ProcessDirectory: Sync {
    /// Snapshot every visible process as `{pid, executable name}`
    fn list_processes(&self) -> Result<Vec<ProcessTarget>>;

    /// Processes whose executable name equals `target`, ignoring ASCII case
    fn find_matching(&self, target: &str) -> Result<Vec<ProcessTarget>> {
        Ok(self
            .list_processes()?
            .into_iter()
            .filter(|p| p.name.eq_ignore_ascii_case(target))
            .collect())
    }
}

/// Read access to one process's address space. Dropping the reader closes it.
pub trait MemoryReader {
    /// The addressable range the walk should cover
    fn address_range(&self) -> Range<usize>;

    /// Metadata for the region containing `address`
    fn query_region(&self, address: usize) -> Result<RegionDescriptor>;

    /// Read `size` bytes at `address`.
    ///
    /// May return fewer bytes than asked when the tail of the range cannot be
    /// read; never pads the result.
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>>;
}

/// Opens read handles on processes
pub trait ProcessOpener: Sync {
    fn open_for_read(&self, pid: u32) -> Result<Box<dyn MemoryReader>>;
}

/// Where captured bytes are persisted
pub trait ArtifactSink: Sync {
    /// Create `path` and its parents. Must tolerate concurrent callers.
    fn ensure_directory(&self, path: &Path) -> Result<()>;

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Receives progress events from the orchestrator.
///
/// Implementations must tolerate interleaved calls from several capture
/// tasks at once.
pub trait Reporter: Sync {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn string_match(&self, target: &ProcessTarget, value: &str);
}
