use serde::Serialize;
use std::time::Duration;

/// Outcome of processing a single job directory.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Job directory name (also the output-file prefix)
    pub name: String,

    /// Number of part files copied for this job
    pub files_copied: usize,

    /// Number of partition directories with no qualifying part file
    pub empty_partitions: usize,

    /// True if the destination subdirectory already existed and the job was
    /// skipped untouched
    pub skipped_existing: bool,
}

impl JobReport {
    /// Creates a report for a job whose destination already existed.
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files_copied: 0,
            empty_partitions: 0,
            skipped_existing: true,
        }
    }
}

/// Aggregate outcome of a flattening run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Total number of job directories selected
    pub total_jobs: usize,

    /// Jobs actually processed this run
    pub jobs_processed: usize,

    /// Jobs skipped because their destination already existed
    pub jobs_skipped: usize,

    /// Total number of files copied
    pub files_copied: usize,

    /// Total number of partition directories with no part file
    pub empty_partitions: usize,

    /// Total execution time
    pub duration: Duration,

    /// Generation timestamp
    pub generated_at: String,

    /// Individual job reports
    pub jobs: Vec<JobReport>,
}

impl RunReport {
    /// Creates an aggregate report from per-job reports.
    #[must_use]
    pub fn new(jobs: Vec<JobReport>, duration: Duration) -> Self {
        let total_jobs = jobs.len();
        let jobs_skipped = jobs.iter().filter(|j| j.skipped_existing).count();
        let jobs_processed = total_jobs - jobs_skipped;
        let files_copied = jobs.iter().map(|j| j.files_copied).sum();
        let empty_partitions = jobs.iter().map(|j| j.empty_partitions).sum();

        Self {
            total_jobs,
            jobs_processed,
            jobs_skipped,
            files_copied,
            empty_partitions,
            duration,
            generated_at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            jobs,
        }
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║               Flattening Run Summary                  ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Job Directories:      {:>8}                        ║",
            self.total_jobs
        );
        println!(
            "║   - Processed:        {:>8}                        ║",
            self.jobs_processed
        );
        println!(
            "║   - Skipped:          {:>8}                        ║",
            self.jobs_skipped
        );
        println!("║                                                       ║");
        println!(
            "║ Files Copied:         {:>8}                        ║",
            self.files_copied
        );
        println!(
            "║ Empty Partitions:     {:>8}                        ║",
            self.empty_partitions
        );
        println!(
            "║ Duration:             {:>8.2}s                       ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝");
        println!("copied {} file(s)", self.files_copied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_sums_job_reports() {
        let jobs = vec![
            JobReport {
                name: "jobA".into(),
                files_copied: 3,
                empty_partitions: 1,
                skipped_existing: false,
            },
            JobReport::skipped("jobB"),
            JobReport {
                name: "jobC".into(),
                files_copied: 2,
                empty_partitions: 0,
                skipped_existing: false,
            },
        ];

        let report = RunReport::new(jobs, Duration::from_millis(42));

        assert_eq!(report.total_jobs, 3);
        assert_eq!(report.jobs_processed, 2);
        assert_eq!(report.jobs_skipped, 1);
        assert_eq!(report.files_copied, 5);
        assert_eq!(report.empty_partitions, 1);
    }

    #[test]
    fn test_empty_run() {
        let report = RunReport::new(Vec::new(), Duration::ZERO);
        assert_eq!(report.total_jobs, 0);
        assert_eq!(report.files_copied, 0);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = RunReport::new(vec![JobReport::skipped("jobA")], Duration::from_secs(1));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"jobs_skipped\":1"));
        assert!(json.contains("\"jobA\""));
    }
}
