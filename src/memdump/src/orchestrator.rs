//! Dump Orchestration
//!
//! Resolves every process matching a name, captures each one on its own
//! worker thread, persists the captures and reports string matches.

use crate::capture::{capture, CaptureBudget, CaptureStats};
use crate::error::Result;
use crate::region::RegionTypePolicy;
use crate::source::{ArtifactSink, ProcessDirectory, ProcessOpener, ProcessTarget, Reporter};
use crate::strings::{extract, MatchSet};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Parameters for one run
#[derive(Debug, Clone)]
pub struct DumpRequest {
    /// Executable name, compared without regard to ASCII case
    pub target: String,
    /// Search string; empty disables extraction
    pub filter: String,
    pub policy: RegionTypePolicy,
    pub budget: CaptureBudget,
    pub output_dir: PathBuf,
}

/// What a successful capture produced
#[derive(Debug, Clone)]
pub struct DumpSummary {
    pub artifact: PathBuf,
    pub bytes_len: usize,
    pub stats: CaptureStats,
    pub matches: MatchSet,
}

#[derive(Debug)]
pub struct ProcessOutcome {
    pub target: ProcessTarget,
    pub result: Result<DumpSummary>,
}

#[derive(Debug)]
pub struct RunReport {
    /// One entry per matched process, in match order
    pub outcomes: Vec<ProcessOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Artifact location for a process: `<dir>/<name>_<pid>.bin`
pub fn artifact_path(output_dir: &Path, target: &ProcessTarget) -> PathBuf {
    let name: String = target
        .name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    output_dir.join(format!("{}_{}.bin", name, target.pid))
}

/// Runs captures against the host capabilities it was built with
pub struct DumpOrchestrator<'a> {
    directory: &'a dyn ProcessDirectory,
    opener: &'a dyn ProcessOpener,
    sink: &'a dyn ArtifactSink,
    reporter: &'a dyn Reporter,
}

impl<'a> DumpOrchestrator<'a> {
    pub fn new(
        directory: &'a dyn ProcessDirectory,
        opener: &'a dyn ProcessOpener,
        sink: &'a dyn ArtifactSink,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            directory,
            opener,
            sink,
            reporter,
        }
    }

    /// Capture every process named `request.target`.
    ///
    /// Only a failed process enumeration fails the run; per-process failures
    /// are reported and recorded in their outcome.
    pub fn run(&self, request: &DumpRequest) -> Result<RunReport> {
        let start = Instant::now();
        let targets = self.directory.find_matching(&request.target)?;

        if targets.is_empty() {
            self.reporter
                .info(&format!("No running process named {}", request.target));
        } else {
            self.reporter.info(&format!(
                "Found {} process(es) named {}",
                targets.len(),
                request.target
            ));
        }

        let outcomes = self.run_all(targets, request);
        Ok(RunReport {
            outcomes,
            elapsed: start.elapsed(),
        })
    }

    fn run_all(&self, targets: Vec<ProcessTarget>, request: &DumpRequest) -> Vec<ProcessOutcome> {
        if targets.is_empty() {
            return Vec::new();
        }

        let task = |target: ProcessTarget| {
            let result = self.dump_one(&target, request);
            ProcessOutcome { target, result }
        };

        // One worker per process so a stalled target only holds its own thread
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(targets.len())
            .thread_name(|i| format!("capture-{}", i))
            .build();

        match pool {
            Ok(pool) => pool.install(|| targets.into_par_iter().map(&task).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to the global thread pool");
                targets.into_par_iter().map(&task).collect()
            }
        }
    }

    fn dump_one(&self, target: &ProcessTarget, request: &DumpRequest) -> Result<DumpSummary> {
        let result = self.capture_and_persist(target, request);
        if let Err(e) = &result {
            self.reporter.error(&format!("[{}] {}", target, e));
        }
        result
    }

    fn capture_and_persist(
        &self,
        target: &ProcessTarget,
        request: &DumpRequest,
    ) -> Result<DumpSummary> {
        let captured = {
            let reader = self.opener.open_for_read(target.pid)?;
            let range = reader.address_range();
            tracing::debug!(process = %target, start = range.start, end = range.end, "walking address space");
            capture(reader.as_ref(), range, request.budget, request.policy)
        };
        let stats = captured.stats;

        let artifact = artifact_path(&request.output_dir, target);
        self.sink.ensure_directory(&request.output_dir)?;
        self.sink.write_file(&artifact, &captured.bytes)?;

        let reporter = self.reporter;
        reporter.success(&format!(
            "[{}] Dumped process to {}",
            target,
            artifact.display()
        ));
        reporter.info(&format!(
            "[{}] Dump size: {} KB",
            target,
            captured.bytes.len() / 1024
        ));
        reporter.info(&format!(
            "[{}] Total memory regions processed: {}",
            target, stats.regions_examined
        ));
        reporter.info(&format!(
            "[{}] Skipped/unreadable regions: {}",
            target, stats.regions_skipped
        ));
        if stats.budget_exhausted {
            reporter.info(&format!(
                "[{}] Capture budget of {} reached",
                target, request.budget
            ));
        }

        let matches = if request.filter.is_empty() {
            MatchSet::new()
        } else {
            extract(&captured.bytes, &request.filter)
        };
        for value in &matches {
            reporter.string_match(target, value);
        }

        Ok(DumpSummary {
            artifact,
            bytes_len: captured.bytes.len(),
            stats,
            matches,
        })
    }
}
