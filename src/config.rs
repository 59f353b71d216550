use crate::error::{Error, Result};
use std::path::PathBuf;

/// Literal token selecting every immediate child of the base directory.
const ALL_TOKEN: &str = "ALL";

/// Which job directories under the base directory to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every immediate child directory of the base directory.
    All,
    /// An explicit list of job directory names.
    Names(Vec<String>),
}

impl Selection {
    /// Parses a selection from the raw CLI token.
    ///
    /// The literal token `ALL` on its own selects every child directory.
    /// Anything else is treated as a comma-separated name list; names are
    /// trimmed and empty tokens dropped. A list containing `ALL` alongside
    /// other names is a plain name list, not the wildcard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no names remain after trimming.
    ///
    /// # Examples
    ///
    /// ```
    /// use partflat::Selection;
    ///
    /// assert_eq!(Selection::parse("ALL").unwrap(), Selection::All);
    ///
    /// let names = Selection::parse("jobA, jobB").unwrap();
    /// assert_eq!(names, Selection::Names(vec!["jobA".into(), "jobB".into()]));
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let names: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        match names.as_slice() {
            [] => Err(Error::invalid_input("sub directory list is empty")),
            [only] if only.as_str() == ALL_TOKEN => Ok(Self::All),
            _ => Ok(Self::Names(names)),
        }
    }

    /// Returns true if this selection is the `ALL` wildcard.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Configuration for a flattening run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Base directory holding per-job output subdirectories
    pub base_dir: PathBuf,

    /// Destination directory receiving one subdirectory per processed job
    pub dest_dir: PathBuf,

    /// Which job directories to process
    pub selection: Selection,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use partflat::{Config, Selection};
    ///
    /// let config = Config::builder()
    ///     .base_dir("/data/jobs")
    ///     .dest_dir("/data/flat")
    ///     .selection(Selection::All)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// Checked before any filesystem side effect occurs, so a failing run
    /// leaves the destination tree untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if:
    /// - The base directory doesn't exist or is not a directory
    /// - The destination directory doesn't exist or is not a directory
    pub fn validate(&self) -> Result<()> {
        if !self.base_dir.exists() {
            return Err(Error::invalid_input(format!(
                "Base directory does not exist: {}",
                self.base_dir.display()
            )));
        }

        if !self.base_dir.is_dir() {
            return Err(Error::invalid_input(format!(
                "Base path is not a directory: {}",
                self.base_dir.display()
            )));
        }

        if !self.dest_dir.exists() {
            return Err(Error::invalid_input(format!(
                "Destination directory does not exist: {}",
                self.dest_dir.display()
            )));
        }

        if !self.dest_dir.is_dir() {
            return Err(Error::invalid_input(format!(
                "Destination path is not a directory: {}",
                self.dest_dir.display()
            )));
        }

        Ok(())
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base_dir: Option<PathBuf>,
    dest_dir: Option<PathBuf>,
    selection: Option<Selection>,
}

impl ConfigBuilder {
    /// Sets the base directory holding job output subdirectories.
    #[must_use]
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Sets the destination directory for flattened output.
    #[must_use]
    pub fn dest_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(path.into());
        self
    }

    /// Sets the job directory selection.
    #[must_use]
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a required field is missing.
    pub fn build(self) -> Result<Config> {
        let base_dir = self
            .base_dir
            .ok_or_else(|| Error::invalid_input("base_dir is required"))?;
        let dest_dir = self
            .dest_dir
            .ok_or_else(|| Error::invalid_input("dest_dir is required"))?;
        let selection = self
            .selection
            .ok_or_else(|| Error::invalid_input("selection is required"))?;

        Ok(Config {
            base_dir,
            dest_dir,
            selection,
        })
    }
}
