use anyhow::Context;
use clap::Parser;
use partflat::{Config, Flattener, Selection};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "partflat",
    version,
    author,
    about = "Flatten partitioned batch-job output into per-partition files",
    long_about = "Flatten partitioned batch-job output trees into a flat destination layout.\n\n\
    Each selected job directory under the base directory holds timestamped \
    partition subdirectories, each with a single part file. The tool copies \
    that file to <DEST_DIR>/<job>/<job>-<timestamp>.json. Jobs whose \
    destination subdirectory already exists are skipped, so re-runs are safe.\n\n\
    USAGE EXAMPLES:\n  \
      # Flatten every job directory\n  \
      partflat /data/jobs ALL /data/flat\n\n  \
      # Flatten selected jobs only\n  \
      partflat /data/jobs jobX,jobY /data/flat\n\n  \
      # Machine-readable report\n  \
      partflat /data/jobs ALL /data/flat --json"
)]
struct Cli {
    /// Base directory holding per-job output subdirectories
    #[arg(value_name = "BASE_DIR")]
    base_dir: PathBuf,

    /// Comma-separated job directory names, or the literal ALL
    #[arg(value_name = "SUB_DIRS")]
    sub_dirs: String,

    /// Destination directory (must already exist)
    #[arg(value_name = "DEST_DIR")]
    dest_dir: PathBuf,

    /// Print the run report as JSON instead of the human summary
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let selection = Selection::parse(&cli.sub_dirs)?;

    let config = Config::builder()
        .base_dir(cli.base_dir)
        .dest_dir(cli.dest_dir)
        .selection(selection)
        .build()
        .context("Failed to build configuration")?;

    let report = Flattener::new(config)
        .context("Failed to create flattener")?
        .run()
        .context("Flattening run failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("partflat=info"),
        1 => EnvFilter::new("partflat=debug"),
        _ => EnvFilter::new("partflat=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
