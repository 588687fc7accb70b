use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{HumanCount, ProgressBar, ProgressStyle};

use woskit_core::{ExtractError, Record};

mod export;

use export::{ALL_ENTITIES, export_entities};

/// Web of Science XML to RIS converter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a WoS XML export into a tagged RIS file
    Convert {
        /// Path to the WoS XML file
        input: PathBuf,

        /// Output path stem (default: the input path without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read at most this many record blocks
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        overwrite: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Suppress the progress spinner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Dump extracted publication info and entity lists as JSON
    Export {
        /// Path to the WoS XML file
        input: PathBuf,

        /// Output path stem (default: the input path without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read at most this many record blocks
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Comma-separated entity lists to include
        #[arg(long, value_delimiter = ',', default_value = "pub_info,authors,addresses,publishers,funding,conferences,references")]
        entities: Vec<String>,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        overwrite: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Suppress the progress spinner
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Whether terminal color is enabled for user-facing messages.
#[derive(Clone, Copy)]
struct ColorMode(bool);

impl ColorMode {
    fn enabled(&self) -> bool {
        self.0
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            input,
            output,
            limit,
            overwrite,
            no_color,
            quiet,
        } => convert(input, output, limit, overwrite, ColorMode(!no_color), quiet),
        Command::Export {
            input,
            output,
            limit,
            entities,
            overwrite,
            no_color,
            quiet,
        } => export(
            input,
            output,
            limit,
            entities,
            overwrite,
            ColorMode(!no_color),
            quiet,
        ),
    }
}

fn convert(
    input: PathBuf,
    output: Option<PathBuf>,
    limit: Option<usize>,
    overwrite: bool,
    color: ColorMode,
    quiet: bool,
) -> anyhow::Result<()> {
    let records = read_with_progress(&input, limit, quiet)?;

    let (entries, failures) = woskit_ris::to_ris_entries(&records);
    report_failures(&failures, color);

    let text = woskit_ris::to_ris_text(&entries);
    let stem = output.unwrap_or_else(|| input.with_extension(""));
    let target = woskit_ris::write_file(&text, &stem, ".txt", overwrite)
        .with_context(|| format!("writing RIS output for {}", input.display()))?;

    let summary = format!(
        "Wrote {} records to {}",
        HumanCount(entries.len() as u64),
        target.display()
    );
    if color.enabled() {
        use owo_colors::OwoColorize;
        println!("{}", summary.green());
    } else {
        println!("{}", summary);
    }

    Ok(())
}

fn export(
    input: PathBuf,
    output: Option<PathBuf>,
    limit: Option<usize>,
    entities: Vec<String>,
    overwrite: bool,
    color: ColorMode,
    quiet: bool,
) -> anyhow::Result<()> {
    for entity in &entities {
        if !ALL_ENTITIES.contains(&entity.as_str()) {
            anyhow::bail!(
                "unknown entity {:?} (expected one of: {})",
                entity,
                ALL_ENTITIES.join(", ")
            );
        }
    }

    let records = read_with_progress(&input, limit, quiet)?;

    let (json, failures) = export_entities(&records, &entities);
    report_failures(&failures, color);

    let text = serde_json::to_string_pretty(&json).context("serializing entity export")?;
    let stem = output.unwrap_or_else(|| input.with_extension(""));
    let target = woskit_ris::write_file(&text, &stem, ".json", overwrite)
        .with_context(|| format!("writing JSON export for {}", input.display()))?;

    let summary = format!(
        "Exported {} records ({}) to {}",
        HumanCount(records.len() as u64),
        entities.join(", "),
        target.display()
    );
    if color.enabled() {
        use owo_colors::OwoColorize;
        println!("{}", summary.green());
    } else {
        println!("{}", summary);
    }

    Ok(())
}

/// Segment and parse the input with a live spinner driven by the
/// segmenter's progress callback.
fn read_with_progress(
    input: &Path,
    limit: Option<usize>,
    quiet: bool,
) -> anyhow::Result<Vec<Record>> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    };

    let records = woskit_core::read_xml(input, limit, |progress| {
        bar.set_message(format!(
            "{} blocks scanned, {} records parsed",
            HumanCount(progress.blocks_scanned),
            HumanCount(progress.records_parsed),
        ));
    })
    .with_context(|| format!("reading {}", input.display()))?;

    bar.finish_and_clear();
    Ok(records)
}

/// Report records whose extraction failed fatally. Siblings have already
/// been converted; these are warnings, not a run failure.
fn report_failures(failures: &[ExtractError], color: ColorMode) {
    for failure in failures {
        let msg = format!("Skipped record: {}", failure);
        if color.enabled() {
            use owo_colors::OwoColorize;
            eprintln!("{}", msg.yellow());
        } else {
            eprintln!("{}", msg);
        }
    }
    if !failures.is_empty() {
        eprintln!("{} records skipped with fatal extraction errors", failures.len());
    }
}
