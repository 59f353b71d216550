//! Progress and warning events emitted during a flattening run.
//!
//! Soft conditions (a skipped entry, an already-processed job) are reported
//! through an [`EventSink`] capability instead of direct console writes, so
//! library callers and tests can run silently or capture the stream.

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// A non-fatal condition or progress notice observed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// An `ALL` selection discovered a base-directory entry that is not a
    /// directory; it is excluded from the working set.
    SkippedNonDirectory {
        /// The non-directory entry
        path: PathBuf,
    },

    /// An explicitly named job directory does not exist. The path stays in
    /// the working set regardless; listing it later fails the run.
    MissingJobDir {
        /// The missing path
        path: PathBuf,
    },

    /// The destination subdirectory for a job already exists; the whole job
    /// is skipped.
    DestinationExists {
        /// The pre-existing destination subdirectory
        path: PathBuf,
    },

    /// A partition directory held no qualifying part file; no output is
    /// produced for it.
    EmptyPartition {
        /// The partition directory
        path: PathBuf,
    },

    /// A part file was copied into the destination tree.
    FileCopied {
        /// Source part file
        from: PathBuf,
        /// Destination output file
        to: PathBuf,
    },
}

/// Receives [`Event`]s emitted during a run.
///
/// Implementations must be usable behind a shared reference; sinks that
/// accumulate state use interior mutability.
pub trait EventSink {
    /// Handles a single event.
    fn emit(&self, event: &Event);
}

/// Default sink forwarding events to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        match event {
            Event::SkippedNonDirectory { path } => {
                warn!("{} is not a directory. Skipping", path.display());
            }
            Event::MissingJobDir { path } => {
                warn!("{} doesn't exist. Skipping", path.display());
            }
            Event::DestinationExists { path } => {
                info!("Output dir {} already existed. Skipping", path.display());
            }
            Event::EmptyPartition { path } => {
                debug!("No part file in {}", path.display());
            }
            Event::FileCopied { from, to } => {
                info!("Copy from {} to {}", from.display(), to.display());
            }
        }
    }
}

/// Sink that records every event in memory.
///
/// Useful for silent operation and for asserting on the event stream in
/// tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event lock poisoned").clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        self.events
            .lock()
            .expect("event lock poisoned")
            .push(event.clone());
    }
}
