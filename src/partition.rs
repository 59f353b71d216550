use crate::error::{Error, Result};

/// Name prefix identifying the canonical output file of a partition.
pub const PART_FILE_PREFIX: &str = "part-r-00000";

/// A partition directory name decomposed into its `_`-delimited segments.
///
/// Batch jobs tag each partition directory with an embedded timestamp:
/// `<prefix>_<timestamp>[_<anything>]`. The timestamp is always the second
/// segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionName {
    segments: Vec<String>,
}

impl PartitionName {
    /// Parses a partition directory name into its segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedName`] if the name has fewer than two
    /// `_`-delimited segments, or if the timestamp segment is empty (a name
    /// ending in a bare `_`).
    ///
    /// # Examples
    ///
    /// ```
    /// use partflat::PartitionName;
    ///
    /// let name = PartitionName::parse("ts_20230101_part").unwrap();
    /// assert_eq!(name.timestamp(), "20230101");
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        let segments: Vec<String> = name.split('_').map(str::to_string).collect();

        if segments.len() < 2 {
            return Err(Error::malformed_name(
                name,
                "expected at least 2 '_'-delimited segments",
            ));
        }

        if segments[1].is_empty() {
            return Err(Error::malformed_name(name, "timestamp segment is empty"));
        }

        Ok(Self { segments })
    }

    /// Returns the timestamp segment of the name.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.segments[1]
    }

    /// Returns all `_`-delimited segments of the name.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// Returns true if a file name identifies a partition's canonical output file.
#[must_use]
pub fn is_part_file(name: &str) -> bool {
    name.starts_with(PART_FILE_PREFIX)
}
