//! Strings command handler
//!
//! Runs string extraction over a dump written by an earlier run.

use crate::report::printable;
use anyhow::{bail, Context, Result};
use memdump::{extract, MatchSet};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Find the strings in a dump file that contain `grep`
pub fn search_file(path: &Path, grep: &str) -> Result<MatchSet> {
    if grep.is_empty() {
        bail!("Search string must not be empty");
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open dump file: {}", path.display()))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat dump file: {}", path.display()))?
        .len();
    if len == 0 {
        return Ok(MatchSet::new());
    }

    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap dump file: {}", path.display()))?;

    Ok(extract(&mmap, grep))
}

/// Handle the strings command
pub fn handle(input: &Path, grep: &str) -> Result<()> {
    let matches = search_file(input, grep)?;

    for value in &matches {
        println!("[STRING] {}", printable(value));
    }
    tracing::info!("{} matching string(s) in {}", matches.len(), input.display());

    Ok(())
}
