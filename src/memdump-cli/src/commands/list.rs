//! List command handler

use anyhow::{Context, Result};
use memdump::{ProcessDirectory, SystemDirectory};

/// Print every running process with the given executable name
pub fn handle(target: &str) -> Result<()> {
    let matches = SystemDirectory
        .find_matching(target)
        .context("Failed to enumerate processes")?;

    if matches.is_empty() {
        println!("No running process named {}", target);
        return Ok(());
    }

    println!("{:>8}  NAME", "PID");
    for process in &matches {
        println!("{:>8}  {}", process.pid, process.name);
    }

    Ok(())
}
