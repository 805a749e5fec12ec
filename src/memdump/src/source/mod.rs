//! Memory Source Abstraction
//!
//! Host capabilities the engine consumes, and their implementations:
//! - Live processes via `LiveProcess` / `SystemDirectory`
//! - Filesystem artifacts via `FsArtifactSink`
//! - Mock sources for testing

mod maps;
#[cfg(test)]
pub(crate) mod mock;
mod process;
mod sink;
mod traits;

pub use maps::{parse_maps, parse_maps_line, read_maps, MapsEntry, MapsSnapshot};
pub use process::{get_tgid, LiveOpener, LiveProcess, SystemDirectory, USER_SPACE_END};
pub use sink::FsArtifactSink;
pub use traits::{
    ArtifactSink, MemoryReader, ProcessDirectory, ProcessOpener, ProcessTarget, Reporter,
};
