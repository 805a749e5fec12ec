//! Mock Host Capabilities
//!
//! In-memory stand-ins for the process directory, memory reader, artifact
//! sink and reporter, for testing capture and orchestration.

use super::traits::{
    ArtifactSink, MemoryReader, ProcessDirectory, ProcessOpener, ProcessTarget, Reporter,
};
use crate::error::{Error, Result};
use crate::region::{Backing, CommitState, Protection, RegionDescriptor};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A fake address space made of explicit regions
#[derive(Debug, Clone)]
pub struct MockProcess {
    pub pid: u32,
    pub range: Range<usize>,
    /// Regions in address order, each with its full contents
    pub regions: Vec<(RegionDescriptor, Vec<u8>)>,
    pub failing_queries: HashSet<usize>,
    pub failing_reads: HashSet<usize>,
    pub short_reads: HashSet<usize>,
}

impl MockProcess {
    pub fn new(pid: u32, range: Range<usize>) -> Self {
        Self {
            pid,
            range,
            regions: Vec::new(),
            failing_queries: HashSet::new(),
            failing_reads: HashSet::new(),
            short_reads: HashSet::new(),
        }
    }

    /// Add a region with explicit metadata
    pub fn region(
        mut self,
        base: usize,
        data: Vec<u8>,
        state: CommitState,
        protection: Protection,
        backing: Backing,
    ) -> Self {
        let descriptor = RegionDescriptor {
            base,
            size: data.len(),
            state,
            protection,
            backing,
        };
        self.regions.push((descriptor, data));
        self.regions.sort_by_key(|(r, _)| r.base);
        self
    }

    /// Add a committed private read-write region
    pub fn private_rw(self, base: usize, data: Vec<u8>) -> Self {
        self.region(
            base,
            data,
            CommitState::Committed,
            Protection::READ | Protection::WRITE,
            Backing::Private,
        )
    }

    /// Add a committed read-only image region
    pub fn image_ro(self, base: usize, data: Vec<u8>) -> Self {
        self.region(
            base,
            data,
            CommitState::Committed,
            Protection::READ,
            Backing::Image,
        )
    }

    pub fn fail_query(mut self, address: usize) -> Self {
        self.failing_queries.insert(address);
        self
    }

    pub fn fail_read(mut self, base: usize) -> Self {
        self.failing_reads.insert(base);
        self
    }

    pub fn short_read(mut self, base: usize) -> Self {
        self.short_reads.insert(base);
        self
    }

    fn containing(&self, address: usize) -> Option<&(RegionDescriptor, Vec<u8>)> {
        self.regions
            .iter()
            .find(|(r, _)| address >= r.base && address < r.end())
    }
}

impl MemoryReader for MockProcess {
    fn address_range(&self) -> Range<usize> {
        self.range.clone()
    }

    fn query_region(&self, address: usize) -> Result<RegionDescriptor> {
        if self.failing_queries.contains(&address) || address >= self.range.end {
            return Err(Error::Query { address });
        }

        if let Some((region, _)) = self.containing(address) {
            return Ok(RegionDescriptor {
                base: address,
                size: region.end() - address,
                ..*region
            });
        }

        let next = self
            .regions
            .iter()
            .map(|(r, _)| r.base)
            .find(|&base| base > address)
            .unwrap_or(self.range.end);

        Ok(RegionDescriptor {
            base: address,
            size: next - address,
            state: CommitState::Free,
            protection: Protection::empty(),
            backing: Backing::Private,
        })
    }

    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        let (region, data) = self
            .containing(address)
            .ok_or(Error::Read { address, size })?;

        if self.failing_reads.contains(&region.base) {
            return Err(Error::Read { address, size });
        }

        let offset = address - region.base;
        if offset + size > data.len() {
            return Err(Error::Read { address, size });
        }

        let bytes = &data[offset..offset + size];
        if self.short_reads.contains(&region.base) {
            return Ok(bytes[..size / 2].to_vec());
        }
        Ok(bytes.to_vec())
    }
}

/// Fixed process list, optionally unavailable
#[derive(Debug, Default)]
pub struct MockDirectory {
    pub processes: Vec<ProcessTarget>,
    pub unavailable: bool,
}

impl MockDirectory {
    pub fn new(processes: Vec<ProcessTarget>) -> Self {
        Self {
            processes,
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            processes: Vec::new(),
            unavailable: true,
        }
    }
}

impl ProcessDirectory for MockDirectory {
    fn list_processes(&self) -> Result<Vec<ProcessTarget>> {
        if self.unavailable {
            return Err(Error::Enumeration("snapshot unavailable".to_string()));
        }
        Ok(self.processes.clone())
    }
}

/// Hands out clones of registered mock processes
#[derive(Debug, Default)]
pub struct MockOpener {
    pub processes: HashMap<u32, MockProcess>,
}

impl MockOpener {
    pub fn with(mut self, process: MockProcess) -> Self {
        self.processes.insert(process.pid, process);
        self
    }
}

impl ProcessOpener for MockOpener {
    fn open_for_read(&self, pid: u32) -> Result<Box<dyn MemoryReader>> {
        let process = self.processes.get(&pid).ok_or_else(|| Error::Open {
            pid,
            reason: "access denied".to_string(),
        })?;
        Ok(Box::new(process.clone()))
    }
}

/// Collects written artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub directories: Mutex<Vec<PathBuf>>,
    pub files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    pub failing_paths: HashSet<PathBuf>,
}

impl MemorySink {
    pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl ArtifactSink for MemorySink {
    fn ensure_directory(&self, path: &Path) -> Result<()> {
        self.directories.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if self.failing_paths.contains(path) {
            return Err(Error::Persist {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

/// What a [`RecordingReporter`] saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Info(String),
    Success(String),
    Error(String),
    Match(u32, String),
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn matches_for(&self, pid: u32) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Match(p, m) if p == pid => Some(m),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Info(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Error(message.to_string()));
    }

    fn string_match(&self, target: &ProcessTarget, value: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Match(target.pid, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_query_clips_and_reports_gaps() {
        let process = MockProcess::new(1, 0x1000..0x8000).private_rw(0x3000, vec![1; 0x2000]);

        let gap = process.query_region(0x1000).unwrap();
        assert_eq!(gap.state, CommitState::Free);
        assert_eq!(gap.end(), 0x3000);

        let inside = process.query_region(0x4000).unwrap();
        assert_eq!(inside.base, 0x4000);
        assert_eq!(inside.end(), 0x5000);

        let tail = process.query_region(0x5000).unwrap();
        assert_eq!(tail.end(), 0x8000);

        assert!(process.query_region(0x8000).is_err());
    }

    #[test]
    fn test_mock_reads() {
        let process = MockProcess::new(1, 0x1000..0x8000)
            .private_rw(0x1000, b"ABCD".to_vec())
            .private_rw(0x2000, b"EFGH".to_vec())
            .short_read(0x2000)
            .private_rw(0x3000, b"IJKL".to_vec())
            .fail_read(0x3000);

        assert_eq!(process.read_bytes(0x1001, 2).unwrap(), b"BC".to_vec());
        assert!(process.read_bytes(0x1002, 10).is_err());
        assert_eq!(process.read_bytes(0x2000, 4).unwrap(), b"EF".to_vec());
        assert!(process.read_bytes(0x3000, 4).is_err());
        assert!(process.read_bytes(0x6000, 1).is_err());
    }

    #[test]
    fn test_mock_opener_missing_pid() {
        let opener = MockOpener::default().with(MockProcess::new(7, 0..0x1000));
        assert!(opener.open_for_read(7).is_ok());
        assert!(matches!(opener.open_for_read(8), Err(Error::Open { pid: 8, .. })));
    }
}
