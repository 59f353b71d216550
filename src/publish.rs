//! Line-oriented file publishing against an abstract message sink.
//!
//! Reads text files from a set of directories and hands every line to a
//! [`MessageSink`], one send at a time, each acknowledged before the next
//! line is read. The sink's transport, connection lifecycle, and retry
//! semantics are entirely the implementor's concern.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tracing::{debug, info};

/// Acknowledgment of a successfully delivered message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ack;

/// Error reported by a [`MessageSink`] for a failed send.
#[derive(ThisError, Debug, Clone)]
#[error("{message}")]
pub struct SendError {
    message: String,
}

impl SendError {
    /// Creates a send error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Capability accepting (topic, payload) pairs.
///
/// One call per input line; the call blocks until the message is confirmed
/// or rejected. No pipelining or batching happens on the caller's side.
pub trait MessageSink {
    /// Delivers one payload to the given topic.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] if the message could not be delivered.
    fn send(&mut self, topic: &str, payload: &[u8]) -> std::result::Result<Ack, SendError>;
}

/// Per-directory outcome of a publishing run.
#[derive(Debug, Clone, Serialize)]
pub struct DirPublishReport {
    /// Directory that was read
    pub path: PathBuf,

    /// Number of lines sent from this directory
    pub lines_sent: usize,
}

/// Aggregate outcome of a publishing run.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Total number of lines sent
    pub total_lines: usize,

    /// Individual directory reports
    pub directories: Vec<DirPublishReport>,
}

/// Publishes the lines of text files to a [`MessageSink`].
pub struct Publisher<S: MessageSink> {
    sink: S,
    topic: String,
    line_limit: Option<usize>,
}

impl<S: MessageSink> Publisher<S> {
    /// Creates a publisher sending to the given topic.
    #[must_use]
    pub fn new(sink: S, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
            line_limit: None,
        }
    }

    /// Limits the number of lines read from each file.
    #[must_use]
    pub fn with_line_limit(mut self, limit: usize) -> Self {
        self.line_limit = Some(limit);
        self
    }

    /// Consumes the publisher and returns the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Publishes every line of every file under `base/<name>` for each name.
    ///
    /// Directory resolution is strict: the base directory and every named
    /// subdirectory must exist up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a directory is missing,
    /// [`Error::Io`] if listing or reading fails, and [`Error::Send`] if the
    /// sink rejects a payload.
    pub fn publish_tree(&mut self, base_dir: &Path, sub_dirs: &[String]) -> Result<PublishReport> {
        let dirs = build_directory_list(base_dir, sub_dirs)?;

        let mut directories = Vec::with_capacity(dirs.len());
        let mut total_lines = 0;

        for dir in dirs {
            info!("Processing directory: {}", dir.display());
            let lines_sent = self.publish_dir(&dir)?;
            debug!("directory {} has {} rows", dir.display(), lines_sent);
            total_lines += lines_sent;
            directories.push(DirPublishReport {
                path: dir,
                lines_sent,
            });
        }

        info!("Successfully produced {total_lines} records");

        Ok(PublishReport {
            total_lines,
            directories,
        })
    }

    /// Publishes the files of one directory in lexicographic name order.
    fn publish_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut files = Vec::new();

        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut total_lines = 0;
        for file in &files {
            total_lines += self.publish_file(file)?;
        }

        Ok(total_lines)
    }

    /// Publishes one file line by line, honoring the per-file line limit.
    fn publish_file(&mut self, path: &Path) -> Result<usize> {
        debug!(
            "Sending content of file {} to topic {}",
            path.display(),
            self.topic
        );

        let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
        let reader = BufReader::new(file);

        let mut lines_sent = 0;
        for line in reader.lines() {
            let line = line.map_err(|e| Error::io(path, e))?;

            self.sink
                .send(&self.topic, line.as_bytes())
                .map_err(|e| Error::send(&self.topic, e))?;
            lines_sent += 1;

            if self.line_limit.is_some_and(|limit| lines_sent >= limit) {
                break;
            }
        }

        Ok(lines_sent)
    }
}

/// Resolves sub-directory names against the base directory, requiring every
/// path to exist.
fn build_directory_list(base_dir: &Path, sub_dirs: &[String]) -> Result<Vec<PathBuf>> {
    if !base_dir.exists() {
        return Err(Error::invalid_input(format!(
            "Base directory does not exist: {}",
            base_dir.display()
        )));
    }

    let mut dirs = Vec::with_capacity(sub_dirs.len());
    for name in sub_dirs {
        let dir = base_dir.join(name.trim());
        if !dir.exists() {
            return Err(Error::invalid_input(format!(
                "Directory does not exist: {}",
                dir.display()
            )));
        }
        dirs.push(dir);
    }

    Ok(dirs)
}
