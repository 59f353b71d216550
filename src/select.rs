use crate::config::Selection;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves a [`Selection`] against the base directory into the working set
/// of job directory paths.
///
/// For [`Selection::All`], immediate children of the base directory are
/// enumerated in directory-listing order; entries that are not directories
/// are excluded with a [`Event::SkippedNonDirectory`] warning.
///
/// For [`Selection::Names`], each name maps to `base/<name>`. A path that
/// does not exist draws a [`Event::MissingJobDir`] warning but is still
/// added to the working set; processing it later fails when its contents
/// are listed.
///
/// # Errors
///
/// Returns [`Error::Io`] if the base directory cannot be listed.
pub(crate) fn select_job_dirs(
    base_dir: &Path,
    selection: &Selection,
    events: &dyn EventSink,
) -> Result<Vec<PathBuf>> {
    let job_dirs = match selection {
        Selection::All => discover_all(base_dir, events)?,
        Selection::Names(names) => resolve_names(base_dir, names, events),
    };

    debug!("Selected {} job directories", job_dirs.len());
    Ok(job_dirs)
}

fn discover_all(base_dir: &Path, events: &dyn EventSink) -> Result<Vec<PathBuf>> {
    let mut job_dirs = Vec::new();

    let entries = fs::read_dir(base_dir).map_err(|e| Error::io(base_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(base_dir, e))?;
        let path = entry.path();

        if path.is_dir() {
            job_dirs.push(path);
        } else {
            events.emit(&Event::SkippedNonDirectory { path });
        }
    }

    Ok(job_dirs)
}

fn resolve_names(base_dir: &Path, names: &[String], events: &dyn EventSink) -> Vec<PathBuf> {
    let mut job_dirs = Vec::with_capacity(names.len());

    for name in names {
        let path = base_dir.join(name);
        if !path.exists() {
            events.emit(&Event::MissingJobDir { path: path.clone() });
        }
        job_dirs.push(path);
    }

    job_dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use assert_fs::prelude::*;

    #[test]
    fn test_all_selects_only_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("A").create_dir_all().unwrap();
        temp.child("B").create_dir_all().unwrap();
        temp.child("C").write_str("plain file").unwrap();

        let sink = MemorySink::new();
        let mut dirs = select_job_dirs(temp.path(), &Selection::All, &sink).unwrap();
        dirs.sort();

        assert_eq!(dirs, vec![temp.path().join("A"), temp.path().join("B")]);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event::SkippedNonDirectory {
                path: temp.path().join("C")
            }
        );
    }

    #[test]
    fn test_all_on_empty_base_is_empty() {
        let temp = assert_fs::TempDir::new().unwrap();

        let sink = MemorySink::new();
        let dirs = select_job_dirs(temp.path(), &Selection::All, &sink).unwrap();

        assert!(dirs.is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_names_resolve_against_base() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("jobA").create_dir_all().unwrap();
        temp.child("jobB").create_dir_all().unwrap();

        let sink = MemorySink::new();
        let selection = Selection::Names(vec!["jobA".into(), "jobB".into()]);
        let dirs = select_job_dirs(temp.path(), &selection, &sink).unwrap();

        assert_eq!(dirs, vec![temp.path().join("jobA"), temp.path().join("jobB")]);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_missing_name_warns_but_stays_in_working_set() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("jobA").create_dir_all().unwrap();

        let sink = MemorySink::new();
        let selection = Selection::Names(vec!["jobA".into(), "ghost".into()]);
        let dirs = select_job_dirs(temp.path(), &selection, &sink).unwrap();

        // The missing path is still selected; the failure surfaces later
        // when its contents are listed.
        assert_eq!(
            dirs,
            vec![temp.path().join("jobA"), temp.path().join("ghost")]
        );
        assert_eq!(
            sink.events(),
            vec![Event::MissingJobDir {
                path: temp.path().join("ghost")
            }]
        );
    }
}
