//! # memdump
//!
//! Read-only process memory acquisition.
//!
//! This library provides functionality to:
//! - Walk a process's address space and capture readable regions under a byte budget
//! - Restrict captures to heap-like or stack-like regions
//! - Extract null-delimited strings containing a search string from a capture
//! - Capture every process matching a name concurrently and persist the results
//!
//! ## Example
//!
//! ```no_run
//! use memdump::{
//!     CaptureBudget, DumpOrchestrator, DumpRequest, FsArtifactSink, LiveOpener,
//!     RegionTypePolicy, Reporter, ProcessTarget, SystemDirectory,
//! };
//!
//! struct Print;
//!
//! impl Reporter for Print {
//!     fn info(&self, m: &str) { println!("{}", m) }
//!     fn success(&self, m: &str) { println!("{}", m) }
//!     fn error(&self, m: &str) { eprintln!("{}", m) }
//!     fn string_match(&self, _: &ProcessTarget, v: &str) { println!("{}", v) }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DumpRequest {
//!     target: "notepad.exe".into(),
//!     filter: "password".into(),
//!     policy: RegionTypePolicy::HeapLike,
//!     budget: CaptureBudget::from_megabytes(256),
//!     output_dir: "dumps".into(),
//! };
//!
//! let report = DumpOrchestrator::new(&SystemDirectory, &LiveOpener, &FsArtifactSink, &Print)
//!     .run(&request)?;
//! println!("{} captured, {} failed", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod classify;
pub mod error;
pub mod orchestrator;
pub mod region;
pub mod source;
pub mod strings;

#[doc(inline)]
pub use capture::{capture, CaptureBudget, CaptureResult, CaptureStats};
#[doc(inline)]
pub use classify::classify;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use orchestrator::{
    artifact_path, DumpOrchestrator, DumpRequest, DumpSummary, ProcessOutcome, RunReport,
};
#[doc(inline)]
pub use region::{Backing, CommitState, Protection, RegionDescriptor, RegionTypePolicy, PAGE_SIZE};
#[doc(inline)]
pub use source::{
    ArtifactSink, FsArtifactSink, LiveOpener, LiveProcess, MemoryReader, ProcessDirectory,
    ProcessOpener, ProcessTarget, Reporter, SystemDirectory,
};
#[doc(inline)]
pub use strings::{extract, MatchSet};
