use crate::{
    config::Config,
    error::{Error, Result},
    events::{Event, EventSink, TracingSink},
    partition::{is_part_file, PartitionName},
    report::{JobReport, RunReport},
    select::select_job_dirs,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Consolidates partitioned batch-job output into one file per partition.
///
/// The source tree is never mutated. Each selected job directory gains a
/// same-named subdirectory under the destination; every partition directory
/// inside it contributes at most one output file named
/// `<job>-<timestamp>.json`. A destination subdirectory that already exists
/// causes the whole job to be skipped, which makes re-runs idempotent at
/// job-directory granularity.
pub struct Flattener {
    config: Config,
    events: Box<dyn EventSink>,
}

impl std::fmt::Debug for Flattener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flattener")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Flattener {
    /// Creates a new flattener with the given configuration.
    ///
    /// Events are forwarded to the `tracing` subscriber; use
    /// [`Flattener::with_event_sink`] to capture them instead.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_event_sink(config, Box::new(TracingSink))
    }

    /// Creates a new flattener reporting events to the given sink.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_event_sink(config: Config, events: Box<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, events })
    }

    /// Executes the flattening run and returns the aggregate report.
    ///
    /// Job directories are processed strictly sequentially, in selection
    /// order. The first fatal condition aborts the run: inconsistent
    /// upstream data invalidates confidence in the remaining unprocessed
    /// directories too.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A job directory's contents cannot be listed
    /// - A partition directory name lacks its timestamp segment
    /// - A partition directory holds more than one qualifying part file
    /// - A destination directory or file cannot be created
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use partflat::{Config, Flattener, Selection};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .base_dir("/data/jobs")
    ///     .dest_dir("/data/flat")
    ///     .selection(Selection::All)
    ///     .build()?;
    ///
    /// let report = Flattener::new(config)?.run()?;
    /// println!("copied {} file(s)", report.files_copied);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(base_dir = %self.config.base_dir.display()))]
    pub fn run(self) -> Result<RunReport> {
        let start_time = Instant::now();

        info!("Starting flattening run");

        let job_dirs = select_job_dirs(
            &self.config.base_dir,
            &self.config.selection,
            self.events.as_ref(),
        )?;

        info!("Will process {} sub directories", job_dirs.len());

        let mut jobs = Vec::with_capacity(job_dirs.len());
        for job_dir in &job_dirs {
            jobs.push(self.process_job_dir(job_dir)?);
        }

        let report = RunReport::new(jobs, start_time.elapsed());

        info!(
            "✓ Run completed: copied {} file(s) in {:.2}s",
            report.files_copied,
            report.duration.as_secs_f64()
        );

        Ok(report)
    }

    /// Processes one job directory into its destination subdirectory.
    fn process_job_dir(&self, job_dir: &Path) -> Result<JobReport> {
        let job_name = job_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::invalid_input(format!("Job path has no name: {}", job_dir.display()))
            })?;

        debug!("Processing directory: {job_name}");

        let dest_sub = self.config.dest_dir.join(&job_name);
        if dest_sub.exists() {
            self.events.emit(&Event::DestinationExists { path: dest_sub });
            return Ok(JobReport::skipped(job_name));
        }

        fs::create_dir(&dest_sub).map_err(|e| Error::io(&dest_sub, e))?;

        let mut files_copied = 0;
        let mut empty_partitions = 0;

        let entries = fs::read_dir(job_dir).map_err(|e| Error::io(job_dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(job_dir, e))?;
            let path = entry.path();

            // No partition can be a plain file at this level.
            if !path.is_dir() {
                continue;
            }

            if self.flatten_partition(&path, &job_name, &dest_sub)? {
                files_copied += 1;
            } else {
                empty_partitions += 1;
            }
        }

        Ok(JobReport {
            name: job_name,
            files_copied,
            empty_partitions,
            skipped_existing: false,
        })
    }

    /// Copies the single part file of one partition directory, if present.
    ///
    /// Returns true if a file was copied, false if the partition held no
    /// qualifying part file.
    fn flatten_partition(&self, partition: &Path, job_name: &str, dest_sub: &Path) -> Result<bool> {
        let name = partition
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = PartitionName::parse(&name)?;

        let part_files = find_part_files(partition)?;
        match part_files.as_slice() {
            [] => {
                self.events.emit(&Event::EmptyPartition {
                    path: partition.to_path_buf(),
                });
                Ok(false)
            }
            [part_file] => {
                let dest = dest_sub.join(format!("{job_name}-{}.json", parsed.timestamp()));
                copy_no_overwrite(part_file, &dest)?;
                self.events.emit(&Event::FileCopied {
                    from: part_file.clone(),
                    to: dest,
                });
                Ok(true)
            }
            many => Err(Error::ambiguous_partition(partition, many.len())),
        }
    }
}

/// Lists the entries of a partition directory whose names match the part
/// file prefix.
fn find_part_files(partition: &Path) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();

    let entries = fs::read_dir(partition).map_err(|e| Error::io(partition, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(partition, e))?;
        if is_part_file(&entry.file_name().to_string_lossy()) {
            matches.push(entry.path());
        }
    }

    Ok(matches)
}

/// Byte-identical copy that refuses to overwrite an existing destination.
fn copy_no_overwrite(src: &Path, dest: &Path) -> Result<()> {
    let mut reader = fs::File::open(src).map_err(|e| Error::io(src, e))?;

    let mut writer = fs::File::options()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| Error::io(dest, e))?;

    io::copy(&mut reader, &mut writer).map_err(|e| Error::io(dest, e))?;
    writer.sync_all().map_err(|e| Error::io(dest, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::events::MemorySink;
    use assert_fs::prelude::*;
    use std::sync::Arc;

    struct SharedSink(Arc<MemorySink>);

    impl EventSink for SharedSink {
        fn emit(&self, event: &Event) {
            self.0.emit(event);
        }
    }

    fn config(base: &Path, dest: &Path, selection: Selection) -> Config {
        Config::builder()
            .base_dir(base)
            .dest_dir(dest)
            .selection(selection)
            .build()
            .unwrap()
    }

    fn run_with_events(config: Config) -> (Result<RunReport>, Vec<Event>) {
        let sink = Arc::new(MemorySink::new());
        let flattener =
            Flattener::with_event_sink(config, Box::new(SharedSink(Arc::clone(&sink)))).unwrap();
        let result = flattener.run();
        let events = sink.events();
        (result, events)
    }

    #[test]
    fn test_end_to_end_single_partition() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/ts_20230101_part/part-r-00000-0001")
            .write_str("{\"id\":1}\n")
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::Names(vec!["jobX".into()]),
        );
        let report = Flattener::new(config).unwrap().run().unwrap();

        assert_eq!(report.files_copied, 1);
        assert_eq!(report.jobs_processed, 1);

        let output = temp.child("dest/jobX/jobX-20230101.json");
        output.assert("{\"id\":1}\n");
    }

    #[test]
    fn test_copy_is_byte_identical() {
        let temp = assert_fs::TempDir::new().unwrap();
        let content = "line one\nline two\n\u{00e9}\u{4e16}\u{754c}";
        temp.child("base/jobX/x_123/part-r-00000")
            .write_str(content)
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::All,
        );
        Flattener::new(config).unwrap().run().unwrap();

        let copied = fs::read(temp.child("dest/jobX/jobX-123.json").path()).unwrap();
        assert_eq!(copied, content.as_bytes());
    }

    #[test]
    fn test_existing_destination_skips_whole_job() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/ts_1/part-r-00000")
            .write_str("fresh")
            .unwrap();
        temp.child("dest/jobX/stale.json").write_str("old").unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::Names(vec!["jobX".into()]),
        );
        let (result, events) = run_with_events(config);
        let report = result.unwrap();

        assert_eq!(report.files_copied, 0);
        assert_eq!(report.jobs_skipped, 1);
        assert!(report.jobs[0].skipped_existing);

        // Pre-existing destination content is left untouched.
        temp.child("dest/jobX/stale.json").assert("old");
        assert!(!temp.child("dest/jobX/jobX-1.json").exists());

        assert!(events
            .iter()
            .any(|e| matches!(e, Event::DestinationExists { .. })));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/ts_777/part-r-00000")
            .write_str("payload")
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let make = || {
            config(
                &temp.path().join("base"),
                &temp.path().join("dest"),
                Selection::All,
            )
        };

        let first = Flattener::new(make()).unwrap().run().unwrap();
        assert_eq!(first.files_copied, 1);

        let second = Flattener::new(make()).unwrap().run().unwrap();
        assert_eq!(second.files_copied, 0);
        assert_eq!(second.jobs_skipped, 1);

        temp.child("dest/jobX/jobX-777.json").assert("payload");
    }

    #[test]
    fn test_empty_partition_produces_no_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/ts_1/_SUCCESS").write_str("").unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::All,
        );
        let (result, events) = run_with_events(config);
        let report = result.unwrap();

        assert_eq!(report.files_copied, 0);
        assert_eq!(report.empty_partitions, 1);
        assert_eq!(
            fs::read_dir(temp.child("dest/jobX").path()).unwrap().count(),
            0
        );
        assert!(events.iter().any(|e| matches!(e, Event::EmptyPartition { .. })));
    }

    #[test]
    fn test_ambiguous_partition_aborts_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobA/ts_1/part-r-00000-0001")
            .write_str("a")
            .unwrap();
        temp.child("base/jobA/ts_1/part-r-00000-0002")
            .write_str("b")
            .unwrap();
        temp.child("base/jobB/ts_2/part-r-00000")
            .write_str("c")
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::Names(vec!["jobA".into(), "jobB".into()]),
        );
        let err = Flattener::new(config).unwrap().run().unwrap_err();

        assert!(err.is_ambiguous_partition());
        // Later job directories are never reached.
        assert!(!temp.child("dest/jobB").exists());
    }

    #[test]
    fn test_malformed_partition_name_aborts_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/nodelimiter/part-r-00000")
            .write_str("x")
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::All,
        );
        let err = Flattener::new(config).unwrap().run().unwrap_err();

        assert!(matches!(err, Error::MalformedName { .. }));
    }

    #[test]
    fn test_missing_explicit_name_fails_at_listing_time() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base").create_dir_all().unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::Names(vec!["ghost".into()]),
        );
        let (result, events) = run_with_events(config);

        // The missing name draws a warning during selection, then the run
        // fails when its contents are listed.
        let err = result.unwrap_err();
        assert!(err.is_io());
        assert!(events.iter().any(|e| matches!(e, Event::MissingJobDir { .. })));
    }

    #[test]
    fn test_plain_files_inside_job_dir_are_ignored() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/_SUCCESS").write_str("").unwrap();
        temp.child("base/jobX/ts_9/part-r-00000")
            .write_str("ok")
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::All,
        );
        let report = Flattener::new(config).unwrap().run().unwrap();

        assert_eq!(report.files_copied, 1);
        temp.child("dest/jobX/jobX-9.json").assert("ok");
    }

    #[test]
    fn test_multiple_partitions_one_job() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("base/jobX/ts_1_a/part-r-00000")
            .write_str("one")
            .unwrap();
        temp.child("base/jobX/ts_2_b/part-r-00000-0007")
            .write_str("two")
            .unwrap();
        temp.child("dest").create_dir_all().unwrap();

        let config = config(
            &temp.path().join("base"),
            &temp.path().join("dest"),
            Selection::All,
        );
        let report = Flattener::new(config).unwrap().run().unwrap();

        assert_eq!(report.files_copied, 2);
        temp.child("dest/jobX/jobX-1.json").assert("one");
        temp.child("dest/jobX/jobX-2.json").assert("two");
    }

    #[test]
    fn test_validation_runs_before_side_effects() {
        let temp = assert_fs::TempDir::new().unwrap();

        let config = config(
            &temp.path().join("missing-base"),
            &temp.path().join("missing-dest"),
            Selection::All,
        );
        let err = Flattener::new(config).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_copy_no_overwrite_refuses_existing_destination() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src").write_str("new").unwrap();
        temp.child("dst").write_str("old").unwrap();

        let err =
            copy_no_overwrite(temp.child("src").path(), temp.child("dst").path()).unwrap_err();

        assert!(err.is_io());
        temp.child("dst").assert("old");
    }
}
