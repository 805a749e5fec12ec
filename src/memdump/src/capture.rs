//! Memory Capture
//!
//! Walks a process's address space in address order, keeps the regions that
//! pass the commit/protection gate and the region-type policy, and
//! concatenates their bytes up to a global budget.

use crate::classify::classify;
use crate::region::{RegionDescriptor, RegionTypePolicy, PAGE_SIZE};
use crate::source::MemoryReader;
use std::fmt;
use std::ops::Range;

const MEGABYTE: u64 = 1024 * 1024;

/// Largest single read issued against a process
pub const READ_CHUNK: usize = 1024 * 1024;

/// Maximum number of bytes kept from one process. Zero means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureBudget(usize);

impl CaptureBudget {
    pub const UNLIMITED: CaptureBudget = CaptureBudget(0);

    pub fn from_bytes(bytes: usize) -> Self {
        Self(bytes)
    }

    pub fn from_megabytes(megabytes: u64) -> Self {
        let bytes = megabytes.saturating_mul(MEGABYTE);
        Self(usize::try_from(bytes).unwrap_or(usize::MAX))
    }

    /// Parse a whole number of megabytes. `None` if the text is not a number.
    pub fn parse_megabytes(text: &str) -> Option<Self> {
        text.trim().parse::<u64>().ok().map(Self::from_megabytes)
    }

    /// Byte ceiling, or `None` when unlimited
    pub fn limit(self) -> Option<usize> {
        (self.0 > 0).then_some(self.0)
    }

    pub fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CaptureBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit() {
            None => f.write_str("unlimited"),
            Some(bytes) if bytes as u64 % MEGABYTE == 0 => {
                write!(f, "{} MB", bytes as u64 / MEGABYTE)
            }
            Some(bytes) => write!(f, "{} bytes", bytes),
        }
    }
}

/// Region accounting for one capture.
///
/// `regions_examined == regions_skipped + regions_included` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Every region query attempted, successful or not
    pub regions_examined: usize,
    /// Failed queries, gate or policy rejections, failed or partial reads
    pub regions_skipped: usize,
    /// Regions read and appended (the last one possibly truncated)
    pub regions_included: usize,
    /// The walk stopped early because the budget was used up
    pub budget_exhausted: bool,
}

/// Bytes captured from one process, in address order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureResult {
    pub bytes: Vec<u8>,
    pub stats: CaptureStats,
}

/// Commit, protection and guard gate, then the policy
fn admits(region: &RegionDescriptor, policy: RegionTypePolicy) -> bool {
    region.is_committed()
        && region.protection.is_readable_class()
        && !region.protection.is_guard()
        && classify(region, policy)
}

/// Read the first `len` bytes of a region in chunks of at most [`READ_CHUNK`].
///
/// `None` if the region is empty or any chunk fails or comes back short; a
/// region is kept whole or not at all.
fn read_region<R: MemoryReader + ?Sized>(
    reader: &R,
    base: usize,
    len: usize,
) -> Option<Vec<u8>> {
    if len == 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(len.min(READ_CHUNK));
    while bytes.len() < len {
        let address = base + bytes.len();
        let want = (len - bytes.len()).min(READ_CHUNK);
        match reader.read_bytes(address, want) {
            Ok(chunk) if chunk.len() == want => bytes.extend_from_slice(&chunk),
            Ok(chunk) => {
                tracing::trace!(
                    base,
                    address,
                    size = want,
                    read = chunk.len(),
                    "partial region read"
                );
                return None;
            }
            Err(e) => {
                tracing::trace!(base, address, error = %e, "region read failed");
                return None;
            }
        }
    }
    Some(bytes)
}

/// Walk `range` of `reader` and capture every qualifying region.
///
/// Failures are per region and only show up in the skip count. The walk
/// advances one page after a failed query and to the end of the reported
/// region otherwise.
pub fn capture<R: MemoryReader + ?Sized>(
    reader: &R,
    range: Range<usize>,
    budget: CaptureBudget,
    policy: RegionTypePolicy,
) -> CaptureResult {
    let mut result = CaptureResult::default();
    let stats = &mut result.stats;
    let mut address = range.start;

    while address < range.end {
        stats.regions_examined += 1;

        let region = match reader.query_region(address) {
            Ok(region) => region,
            Err(e) => {
                tracing::trace!(address, error = %e, "region query failed");
                stats.regions_skipped += 1;
                address = address.saturating_add(PAGE_SIZE);
                continue;
            }
        };
        let next = region.end().max(address.saturating_add(PAGE_SIZE));

        if !admits(&region, policy) {
            stats.regions_skipped += 1;
            address = next;
            continue;
        }

        let room = budget.limit().map(|limit| limit - result.bytes.len());
        let wanted = room.map_or(region.size, |room| region.size.min(room));

        let Some(bytes) = read_region(reader, region.base, wanted) else {
            stats.regions_skipped += 1;
            address = next;
            continue;
        };

        stats.regions_included += 1;
        result.bytes.extend_from_slice(&bytes);

        if room.is_some_and(|room| bytes.len() >= room) {
            stats.budget_exhausted = true;
            tracing::debug!(
                base = region.base,
                kept = bytes.len(),
                dropped = region.size - bytes.len(),
                "capture budget reached"
            );
            break;
        }

        address = next;
    }

    result
}
