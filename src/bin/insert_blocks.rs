//! Insert operator-written fields into records of a content data file.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use textsplice::config::duplicate_ids;
use textsplice::report::{configure_colors, format_batch, format_preview};
use textsplice::store::{read_document, write_document};
use textsplice::{load_job, preview, run, Locator};

#[derive(Debug, Parser)]
#[command(
    name = "textsplice-insert",
    about = "Insert content blocks after a known field of each listed record"
)]
struct Args {
    /// TOML job file with the layout and the per-record fields.
    #[arg(long, value_name = "FILE")]
    job: PathBuf,

    /// Data file to rewrite in place.
    #[arg(long, value_name = "FILE")]
    document: PathBuf,

    /// Print the blocks that would be inserted and leave the document alone.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    configure_colors();

    let args = Args::parse();

    // preconditions: nothing is touched unless both inputs load
    let job = load_job(&args.job)
        .with_context(|| format!("cannot load job {}", args.job.display()))?;
    let locator = Locator::new(job.layout.clone()).context("invalid record layout")?;
    let document = read_document(&args.document)?;

    for id in duplicate_ids(&job) {
        warn!(record = id, "record listed more than once in the job");
    }
    info!(
        records = job.records.len(),
        document = %args.document.display(),
        "starting batch"
    );

    if args.dry_run {
        let entries = preview(&document, job.payloads(), &locator);
        print!("{}", format_preview(&entries));
        return Ok(());
    }

    let (updated, report) = run(&document, job.payloads(), &locator);
    if report.inserted() > 0 {
        write_document(&args.document, &updated)?;
    }
    print!("{}", format_batch(&report, &args.document));

    Ok(())
}
