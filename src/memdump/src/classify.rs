//! Region classification
//!
//! Decides whether a region that already passed the commit/protection gate
//! belongs to the requested region type.

use crate::region::{Protection, RegionDescriptor, RegionTypePolicy};

/// Decide whether `region` is kept under `policy`.
///
/// `StackLike` is a heuristic: it accepts private guard pages and private
/// read-write pages, so ordinary read-write heap memory is accepted as well.
/// Real stack identification would need per-thread stack bounds.
pub fn classify(region: &RegionDescriptor, policy: RegionTypePolicy) -> bool {
    match policy {
        RegionTypePolicy::All => true,
        RegionTypePolicy::HeapLike => region.is_private(),
        RegionTypePolicy::StackLike => {
            let guard = region.protection.is_guard();
            let writable = region.protection.contains(Protection::WRITE);
            region.is_private() && (guard || writable)
        }
    }
}
