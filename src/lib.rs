//! # partflat
//!
//! A library for flattening partitioned batch-job output trees.
//!
//! ## Features
//!
//! - Consolidates timestamped partition directories into one file per
//!   partition, named `<job>-<timestamp>.json`
//! - Idempotent re-runs at job-directory granularity
//! - Fails fast on inconsistent upstream output (more than one part file
//!   in a partition)
//! - Progress and warnings reported through a pluggable event sink
//! - Line-oriented publishing of text files to an abstract message sink
//!
//! ## Quick Start
//!
//! ```no_run
//! use partflat::{Config, Flattener, Selection};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .base_dir("/data/jobs")
//!     .dest_dir("/data/flat")
//!     .selection(Selection::parse("ALL")?)
//!     .build()?;
//!
//! let report = Flattener::new(config)?.run()?;
//! println!("copied {} file(s)", report.files_copied);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a small pipeline:
//! 1. **Select**: resolves the requested job directories under the base
//! 2. **Flatten**: creates one destination subdirectory per job and copies
//!    each partition's single part file into it
//! 3. **Report**: returns an explicit [`RunReport`] instead of mutating
//!    global counters

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod events;
mod flatten;
mod partition;
mod report;
mod select;

pub mod publish;

pub use config::{Config, ConfigBuilder, Selection};
pub use error::{Error, Result};
pub use events::{Event, EventSink, MemorySink, TracingSink};
pub use flatten::Flattener;
pub use partition::{is_part_file, PartitionName, PART_FILE_PREFIX};
pub use publish::{Ack, MessageSink, PublishReport, Publisher, SendError};
pub use report::{JobReport, RunReport};

/// Runs a complete flattening pass with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid (missing base or destination directory)
/// - A job directory cannot be listed
/// - A partition directory name is malformed
/// - A partition holds more than one part file
/// - A destination directory or file cannot be created
///
/// # Examples
///
/// ```no_run
/// use partflat::{run, Config, Selection};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .base_dir("/data/jobs")
///     .dest_dir("/data/flat")
///     .selection(Selection::Names(vec!["jobX".into()]))
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunReport> {
    Flattener::new(config)?.run()
}
