//! Console reporting
//!
//! Status messages go through `tracing` (stderr); string matches are printed
//! on stdout so they can be piped.

use memdump::{ProcessTarget, Reporter};

/// Replace control characters so a match prints on one line
pub fn printable(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn success(&self, message: &str) {
        tracing::info!(status = "ok", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn string_match(&self, target: &ProcessTarget, value: &str) {
        println!("[STRING] {} {}", target, printable(value));
    }
}
