// std imports
use std::fs::{read_to_string, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// 3rd party imports
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

// internal imports
use peptidomics_enzymes::{
    import_dataset, AnalysisConfig, Enzyme, GroupBy, ProteinLibrary, UniprotRecord,
};

/// Output format of the analysis
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pivot table, one column per group
    Csv,
    /// Nested per-group summary
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify the cleavage sites of measured peptides and sum intensities
    /// per enzyme and orphan residue
    Analyze {
        /// Comma-delimited peptide measurements with a header row
        #[arg(short, long)]
        peptides: PathBuf,
        /// FASTA library containing the parent proteins
        #[arg(short, long)]
        fasta: PathBuf,
        /// Enzyme to test, can be used multiple times. Default: all
        #[arg(short, long, action = clap::ArgAction::Append)]
        enzyme: Vec<String>,
        /// Peptide attribute to group by: sample or accession
        #[arg(short, long, value_parser = GroupBy::from_str)]
        group_by: Option<GroupBy>,
        /// JSON analysis configuration, overridden by the flags above
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Output file, default: stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Prints the names of all enzymes in the catalog
    Enzymes {},
    /// Converts downloaded UniProtKB text entries into a FASTA library
    Uniprot {
        /// Remove the annotated signal peptide
        #[arg(long, default_value = "false")]
        cut_signal: bool,
        /// Output file, default: stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// UniProtKB flat files, each may contain several entries
        #[arg(num_args = 1..)]
        entries: Vec<PathBuf>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "peptidomics-enzymes")]
struct Cli {
    /// Verbosity level
    /// 0 - Warn
    /// 1 - Info
    /// 2 - Debug
    /// > 2 - Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

fn read(path: &Path) -> Result<String> {
    read_to_string(path).with_context(|| format!("Error when reading `{}`", path.display()))
}

fn writer(output: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Error when creating `{}`", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    })
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let verbosity = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(verbosity.into()))
        .init();

    match args.command {
        Commands::Analyze {
            peptides,
            fasta,
            enzyme,
            group_by,
            config,
            format,
            output,
        } => {
            let mut analysis = match config {
                Some(path) => AnalysisConfig::from_json(&read(&path)?)
                    .with_context(|| format!("Error when parsing `{}`", path.display()))?,
                None => AnalysisConfig::default(),
            };
            if !enzyme.is_empty() {
                analysis.enzymes = enzyme;
            }
            if let Some(group_by) = group_by {
                analysis.group_by = group_by;
            }

            let dataset = import_dataset(
                &read(&peptides)?,
                &read(&fasta)?,
                analysis.enzymes.as_slice(),
            )
            .context("Error when importing peptides")?;
            if !dataset.skipped.is_empty() {
                warn!(
                    "{} rows skipped, first at line {}: {}",
                    dataset.skipped.len(),
                    dataset.skipped[0].line,
                    dataset.skipped[0].reason
                );
            }

            let summary = dataset.aggregate(analysis.group_by);
            info!(
                "{} groups by {} over {} enzymes",
                summary.buckets.len(),
                summary.group_by,
                summary.selection.enzymes().len()
            );

            let mut out = writer(output.as_ref())?;
            match format {
                OutputFormat::Csv => summary
                    .pivot()
                    .write_csv(&mut out)
                    .context("Error when writing pivot table")?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &summary)
                        .context("Error when writing summary")?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Enzymes {} => {
            let mut out = io::stdout();
            for enzyme in Enzyme::ALL.iter() {
                writeln!(out, "{}", enzyme)?;
            }
        }
        Commands::Uniprot {
            cut_signal,
            output,
            entries,
        } => {
            if entries.is_empty() {
                bail!("No UniProtKB entries given");
            }
            let mut library = ProteinLibrary::new();
            for path in &entries {
                let records = UniprotRecord::parse_all(&read(path)?, cut_signal)
                    .with_context(|| format!("Error when parsing `{}`", path.display()))?;
                for record in records {
                    library.insert(record.to_protein());
                }
            }
            info!("converted {} UniProtKB entries", library.len());
            writer(output.as_ref())?
                .write_all(library.to_fasta().as_bytes())
                .context("Error when writing FASTA")?;
        }
    }

    Ok(())
}
