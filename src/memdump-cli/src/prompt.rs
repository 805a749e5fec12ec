//! Interactive parameter entry for `memdump dump` without a target

use anyhow::{bail, Context, Result};
use memdump::RegionTypePolicy;
use std::io::{BufRead, Write};

/// Settings entered at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub target: String,
    pub grep: String,
    pub region: Option<RegionTypePolicy>,
    /// Raw budget text; empty means "use the default"
    pub max_size_mb: String,
}

/// Print `question` and read one trimmed line
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{} ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Walk the operator through every dump setting
pub fn collect<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Answers> {
    let target = ask(input, output, "Enter process name (e.g. chrome.exe):")?
        .trim()
        .to_string();
    if target.is_empty() {
        bail!("No process name given");
    }

    let grep = ask(
        input,
        output,
        "Enter string to search for (or leave empty to dump full memory):",
    )?;

    let region_text = ask(
        input,
        output,
        "Enter memory region to dump (all / heap / stack), default all:",
    )?;
    let region = if region_text.trim().is_empty() {
        None
    } else {
        Some(region_text.parse::<RegionTypePolicy>()?)
    };

    let max_size_mb = ask(input, output, "Enter max dump size in MB (0 for unlimited):")?
        .trim()
        .to_string();

    Ok(Answers {
        target,
        grep,
        region,
        max_size_mb,
    })
}
