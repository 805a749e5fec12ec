//! Memory Region Types
//!
//! Snapshot metadata for one contiguous range of a target's address space,
//! and the region-type policy used to decide which ranges get captured.

use crate::error::Error;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity of the address-space walk
pub const PAGE_SIZE: usize = 0x1000;

/// Whether the host backs a range with storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Committed,
    Reserved,
    Free,
}

/// What a range is mapped from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// Anonymous memory (heap, stacks, private allocations)
    Private,
    /// A file or shared mapping
    Mapped,
    /// A loaded executable or library image
    Image,
}

bitflags! {
    /// Page protection of a region
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Protection: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXECUTE = 1 << 2;
        const GUARD = 1 << 3;
        const COPY_ON_WRITE = 1 << 4;
    }
}

impl Protection {
    /// Read-only, read-write, execute-read or execute-read-write.
    ///
    /// Copy-on-write pages are excluded until they have been written.
    pub fn is_readable_class(self) -> bool {
        self.contains(Protection::READ) && !self.contains(Protection::COPY_ON_WRITE)
    }

    pub fn is_guard(self) -> bool {
        self.contains(Protection::GUARD)
    }
}

/// One contiguous range as reported by a region query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub base: usize,
    pub size: usize,
    pub state: CommitState,
    pub protection: Protection,
    pub backing: Backing,
}

impl RegionDescriptor {
    /// First address past the region, saturating at the top of the address space
    pub fn end(&self) -> usize {
        self.base.saturating_add(self.size)
    }

    pub fn is_committed(&self) -> bool {
        self.state == CommitState::Committed
    }

    pub fn is_private(&self) -> bool {
        self.backing == Backing::Private
    }
}

/// Which kinds of committed regions a capture keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionTypePolicy {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "heap")]
    HeapLike,
    #[serde(rename = "stack")]
    StackLike,
}

impl RegionTypePolicy {
    pub fn token(self) -> &'static str {
        match self {
            RegionTypePolicy::All => "all",
            RegionTypePolicy::HeapLike => "heap",
            RegionTypePolicy::StackLike => "stack",
        }
    }
}

impl FromStr for RegionTypePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("all") {
            Ok(RegionTypePolicy::All)
        } else if token.eq_ignore_ascii_case("heap") {
            Ok(RegionTypePolicy::HeapLike)
        } else if token.eq_ignore_ascii_case("stack") {
            Ok(RegionTypePolicy::StackLike)
        } else {
            Err(Error::InvalidPolicy(s.to_string()))
        }
    }
}

impl fmt::Display for RegionTypePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
