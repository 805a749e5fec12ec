//! /proc/pid/maps Snapshots
//!
//! Parses the kernel's mapping list (smaps when available) and answers region
//! queries against it with the same shape a page-granular query primitive
//! would give: the range from the queried page to the end of its mapping, or
//! a free range up to the next mapping.

use crate::error::{Error, Result};
use crate::region::{Backing, CommitState, Protection, RegionDescriptor, PAGE_SIZE};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// A memory region from /proc/pid/maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsEntry {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    pub offset: usize,
    pub path: Option<String>,
    /// Bytes of anonymous pages in the mapping, when read from smaps
    pub anonymous_bytes: Option<usize>,
}

impl MapsEntry {
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.chars().nth(1) == Some('w')
    }

    pub fn is_executable(&self) -> bool {
        self.perms.chars().nth(2) == Some('x')
    }

    pub fn is_shared(&self) -> bool {
        self.perms.chars().nth(3) == Some('s')
    }

    fn has_access(&self) -> bool {
        self.is_readable() || self.is_writable() || self.is_executable()
    }

    /// Private file mapping whose pages are all still shared with the file
    fn is_unwritten_copy_on_write(&self) -> bool {
        self.is_writable()
            && !self.is_shared()
            && !self.is_anonymous()
            && self.anonymous_bytes == Some(0)
    }

    /// Anonymous memory, including the kernel-named heap and stack mappings
    fn is_anonymous(&self) -> bool {
        match self.path.as_deref() {
            None => true,
            Some(p) => p == "[heap]" || p.starts_with("[stack") || p.starts_with("[anon"),
        }
    }
}

/// Parse one line of /proc/pid/maps, skipping malformed lines
pub fn parse_maps_line(line: &str) -> Option<MapsEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (range, perms) = (parts.first()?, parts.get(1)?);

    let (start, end) = range.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    if end < start {
        return None;
    }

    let offset = parts
        .get(2)
        .and_then(|s| usize::from_str_radix(s, 16).ok())
        .unwrap_or(0);
    let path = if parts.len() > 5 {
        Some(parts[5..].join(" "))
    } else {
        None
    };

    Some(MapsEntry {
        start,
        end,
        perms: perms.to_string(),
        offset,
        path,
        anonymous_bytes: None,
    })
}

/// Parse a full maps listing
pub fn parse_maps<R: BufRead>(reader: R) -> std::io::Result<Vec<MapsEntry>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        if let Some(entry) = parse_maps_line(&line?) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Parse a /proc/pid/smaps listing: maps lines, each followed by its fields.
/// Only `Anonymous:` is kept.
pub fn parse_smaps<R: BufRead>(reader: R) -> std::io::Result<Vec<MapsEntry>> {
    let mut entries: Vec<MapsEntry> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(value) = line.strip_prefix("Anonymous:") {
            let kb = value.trim().trim_end_matches("kB").trim().parse::<usize>().ok();
            if let (Some(entry), Some(kb)) = (entries.last_mut(), kb) {
                entry.anonymous_bytes = Some(kb * 1024);
            }
        } else if let Some(entry) = parse_maps_line(&line) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Read the mappings of a live process, from smaps when the kernel has it
pub fn read_maps(pid: u32) -> Result<Vec<MapsEntry>> {
    let open_error = |path: &str, e: std::io::Error| Error::Open {
        pid,
        reason: format!("cannot read {}: {}", path, e),
    };

    let smaps_path = format!("/proc/{}/smaps", pid);
    if let Ok(file) = File::open(&smaps_path) {
        return parse_smaps(BufReader::new(file)).map_err(|e| open_error(&smaps_path, e));
    }

    let maps_path = format!("/proc/{}/maps", pid);
    let file = File::open(&maps_path).map_err(|e| open_error(&maps_path, e))?;
    parse_maps(BufReader::new(file)).map_err(|e| open_error(&maps_path, e))
}

/// Immutable view of a process's mappings, queried by address
#[derive(Debug, Clone)]
pub struct MapsSnapshot {
    entries: Vec<MapsEntry>,
    image_paths: HashSet<String>,
    limit: usize,
}

impl MapsSnapshot {
    /// Build a snapshot. Queries at or above `limit` fail.
    pub fn new(mut entries: Vec<MapsEntry>, limit: usize) -> Self {
        entries.sort_by_key(|e| e.start);

        // A file with any executable mapping is a loaded image; all of its
        // mappings count as image-backed.
        let image_paths = entries
            .iter()
            .filter(|e| e.is_executable() && !e.is_anonymous())
            .filter_map(|e| e.path.clone())
            .collect();

        Self {
            entries,
            image_paths,
            limit,
        }
    }

    pub fn entries(&self) -> &[MapsEntry] {
        &self.entries
    }

    /// Describe the region containing `address`
    pub fn query(&self, address: usize) -> Result<RegionDescriptor> {
        if address >= self.limit {
            return Err(Error::Query { address });
        }

        let page = address & !(PAGE_SIZE - 1);
        let idx = self.entries.partition_point(|e| e.end <= page);

        match self.entries.get(idx) {
            Some(entry) if entry.start <= page => Ok(self.describe(idx, page)),
            Some(entry) => Ok(free_range(page, entry.start - page)),
            None => Ok(free_range(page, self.limit - page)),
        }
    }

    fn describe(&self, idx: usize, page: usize) -> RegionDescriptor {
        let entry = &self.entries[idx];
        let backing = self.backing_of(entry);

        let mut protection = Protection::empty();
        if entry.is_readable() {
            protection |= Protection::READ;
        }
        if entry.is_writable() {
            protection |= Protection::WRITE;
        }
        if entry.is_executable() {
            protection |= Protection::EXECUTE;
        }
        if entry.is_unwritten_copy_on_write() {
            protection |= Protection::COPY_ON_WRITE;
        }

        let state = if entry.has_access() {
            CommitState::Committed
        } else if self.is_stack_guard(idx) {
            protection |= Protection::GUARD;
            CommitState::Committed
        } else {
            CommitState::Reserved
        };

        RegionDescriptor {
            base: page,
            size: entry.end - page,
            state,
            protection,
            backing,
        }
    }

    fn backing_of(&self, entry: &MapsEntry) -> Backing {
        if entry.is_shared() {
            return Backing::Mapped;
        }
        match entry.path.as_deref() {
            _ if entry.is_anonymous() => Backing::Private,
            Some(p) if p.starts_with('[') => Backing::Image,
            Some(p) if self.image_paths.contains(p) => Backing::Image,
            _ => Backing::Mapped,
        }
    }

    /// An inaccessible anonymous mapping sitting directly below an anonymous
    /// read-write mapping, which is how thread stacks lay out their guard.
    fn is_stack_guard(&self, idx: usize) -> bool {
        let entry = &self.entries[idx];
        if entry.has_access() || entry.is_shared() || !entry.is_anonymous() {
            return false;
        }

        self.entries.get(idx + 1).is_some_and(|next| {
            next.start == entry.end
                && next.is_anonymous()
                && !next.is_shared()
                && next.is_readable()
                && next.is_writable()
        })
    }
}

/// Unmapped gap. Free ranges carry no backing and report as private with no access.
fn free_range(base: usize, size: usize) -> RegionDescriptor {
    RegionDescriptor {
        base,
        size,
        state: CommitState::Free,
        protection: Protection::empty(),
        backing: Backing::Private,
    }
}
