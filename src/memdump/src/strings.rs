//! String Extraction
//!
//! Finds the null-delimited runs of a capture that contain a search string.

use memchr::{memchr, memmem, memrchr};
use std::collections::BTreeSet;

/// Unique matching runs, in lexicographic order
pub type MatchSet = BTreeSet<String>;

/// Collect every null-delimited run of `blob` containing `filter`.
///
/// An empty filter yields an empty set; callers should skip extraction
/// instead of treating it as "match everything". Scanning resumes after the
/// end of each recovered run, so a run is reported once however many times
/// the filter occurs in it. Runs that are not valid UTF-8 are converted
/// lossily.
pub fn extract(blob: &[u8], filter: &str) -> MatchSet {
    let mut matches = MatchSet::new();
    if filter.is_empty() {
        return matches;
    }

    let needle = filter.as_bytes();
    let finder = memmem::Finder::new(needle);
    let mut pos = 0;

    while let Some(offset) = finder.find(&blob[pos..]) {
        let hit = pos + offset;
        let start = memrchr(0, &blob[..hit]).map_or(0, |i| i + 1);
        let end = memchr(0, &blob[hit..]).map_or(blob.len(), |i| hit + i);

        let run = &blob[start..end];
        if finder.find(run).is_some() {
            matches.insert(String::from_utf8_lossy(run).into_owned());
        }

        // A filter containing NUL never spans a whole run; still move forward
        pos = end.max(hit + 1);
        if pos >= blob.len() {
            break;
        }
    }

    matches
}
