//! Live Process Memory Source
//!
//! Host implementations backed by the running system: `sysinfo` for the
//! process list, `process-memory` for reads and /proc/pid/smaps for region
//! metadata.

use super::maps::{read_maps, MapsSnapshot};
use super::traits::{MemoryReader, ProcessDirectory, ProcessOpener, ProcessTarget};
use crate::error::{Error, Result};
use crate::region::{RegionDescriptor, PAGE_SIZE};

use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use std::ops::Range;
use sysinfo::{Process, System};

/// Top of the user address range
#[cfg(target_pointer_width = "64")]
pub const USER_SPACE_END: usize = 0x0000_7fff_ffff_f000;
#[cfg(not(target_pointer_width = "64"))]
pub const USER_SPACE_END: usize = 0xc000_0000;

/// Read handle on a live process
pub struct LiveProcess {
    handle: ProcessHandle,
    maps: MapsSnapshot,
}

impl LiveProcess {
    /// Open `pid` for reading and snapshot its mappings
    pub fn open(pid: u32) -> Result<Self> {
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|e| Error::Open {
                pid,
                reason: e.to_string(),
            })?;

        let maps = MapsSnapshot::new(read_maps(pid)?, USER_SPACE_END);
        tracing::debug!(pid, mappings = maps.entries().len(), "opened process");

        Ok(Self { handle, maps })
    }
}

impl MemoryReader for LiveProcess {
    fn address_range(&self) -> Range<usize> {
        PAGE_SIZE..USER_SPACE_END
    }

    fn query_region(&self, address: usize) -> Result<RegionDescriptor> {
        self.maps.query(address)
    }

    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut copied = 0;

        // copy_address reports success for a short transfer, so never ask it
        // for more than one page at a time
        while copied < size {
            let at = address + copied;
            let page_end = (at & !(PAGE_SIZE - 1)).saturating_add(PAGE_SIZE);
            let len = (page_end - at).min(size - copied);

            if self
                .handle
                .copy_address(at, &mut buffer[copied..copied + len])
                .is_err()
            {
                break;
            }
            copied += len;
        }

        if copied == 0 && size > 0 {
            return Err(Error::Read { address, size });
        }
        buffer.truncate(copied);
        Ok(buffer)
    }
}

/// Opens [`LiveProcess`] readers
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveOpener;

impl ProcessOpener for LiveOpener {
    fn open_for_read(&self, pid: u32) -> Result<Box<dyn MemoryReader>> {
        Ok(Box::new(LiveProcess::open(pid)?))
    }
}

/// Process directory backed by `sysinfo`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDirectory;

impl SystemDirectory {
    fn snapshot() -> Result<System> {
        let mut system = System::new_all();
        system.refresh_all();

        if system.processes().is_empty() {
            return Err(Error::Enumeration("no processes visible".to_string()));
        }
        Ok(system)
    }
}

/// Threads show up as their own entries on Linux; keep only group leaders
fn is_group_leader(process: &Process) -> bool {
    let pid = process.pid().as_u32();
    get_tgid(pid).map_or(true, |tgid| tgid == pid)
}

fn to_target(process: &Process) -> ProcessTarget {
    ProcessTarget::new(
        process.pid().as_u32(),
        process.name().to_string_lossy().into_owned(),
    )
}

impl ProcessDirectory for SystemDirectory {
    fn list_processes(&self) -> Result<Vec<ProcessTarget>> {
        let system = Self::snapshot()?;

        let mut targets: Vec<ProcessTarget> = system
            .processes()
            .values()
            .filter(|p| is_group_leader(p))
            .map(to_target)
            .collect();

        targets.sort_by_key(|t| t.pid);
        Ok(targets)
    }

    fn find_matching(&self, target: &str) -> Result<Vec<ProcessTarget>> {
        let system = Self::snapshot()?;

        let mut matches: Vec<ProcessTarget> = system
            .processes()
            .values()
            .filter(|p| is_group_leader(p))
            .filter(|process| {
                let name_matches = process.name().to_string_lossy().eq_ignore_ascii_case(target);
                // Process names are truncated on some hosts, so also try the executable
                let exe_matches = process
                    .exe()
                    .and_then(|exe| exe.file_name())
                    .is_some_and(|file| file.to_string_lossy().eq_ignore_ascii_case(target));
                name_matches || exe_matches
            })
            .map(to_target)
            .collect();

        matches.sort_by_key(|t| t.pid);
        Ok(matches)
    }
}

/// Get the thread group ID (main process) for a given PID/TID
pub fn get_tgid(pid: u32) -> Option<u32> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    status
        .lines()
        .find(|line| line.starts_with("Tgid:"))?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()
}
