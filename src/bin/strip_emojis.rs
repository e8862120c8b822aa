//! Remove emoji characters from source files.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use textsplice::emoji::{collect_sources, strip_files, FieldBlanker};
use textsplice::report::{configure_colors, format_strip};

#[derive(Debug, Parser)]
#[command(
    name = "textsplice-strip",
    about = "Strip emoji code points from files, directories or globs"
)]
struct Args {
    /// Files, directories (walked for .ts/.tsx/.js/.jsx) or glob patterns.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<String>,

    /// Also empty every non-empty string value of this field.
    #[arg(long, value_name = "FIELD")]
    clear_field: Option<String>,

    /// Comment left after a cleared field.
    #[arg(long, default_value = FieldBlanker::DEFAULT_COMMENT)]
    comment: String,

    /// String literal delimiter used by the cleared field.
    #[arg(long, default_value_t = '\'')]
    quote: char,
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
    let blanker = args
        .clear_field
        .as_deref()
        .map(|field| FieldBlanker::new(field, args.quote, &args.comment))
        .transpose()?;
    let paths = collect_sources(&args.paths)?;

    println!("Removing emojis from {} files...\n", paths.len());
    let report = strip_files(&paths, blanker.as_ref());
    print!("{}", format_strip(&report));

    Ok(())
}
