use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bio::fasta;
use crate::tools::diamond::{AlignmentRecord, DiamondAligner, Sensitivity};

#[derive(Args)]
pub struct AlignArgs {
    /// Amino acid sequences, or the path to a FASTA file of queries
    #[arg(required = true)]
    pub sequences: Vec<String>,

    /// Reference FASTA file to align against
    #[arg(short, long)]
    pub reference: PathBuf,

    /// DIAMOND sensitivity tier
    #[arg(short, long, default_value = "very-sensitive")]
    pub sensitivity: Sensitivity,

    /// DIAMOND binary (name on PATH or explicit path)
    #[arg(long, default_value = "diamond", env = "IRIS_DIAMOND")]
    pub diamond: PathBuf,

    /// Keep the raw tabular output at this path instead of a temporary file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AlignArgs) -> Result<()> {
    if !args.reference.exists() {
        anyhow::bail!("reference file not found: {}", args.reference.display());
    }
    let sequences = load_sequences(&args.sequences)?;

    let binary = resolve_binary(args.diamond)?;
    let aligner = DiamondAligner::new(binary)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner:.green} {msg}")
            .expect("static template"),
    );
    spinner.set_message(format!(
        "Running DIAMOND at {} sensitivity",
        args.sensitivity
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = aligner.align(
        &sequences,
        &args.reference,
        args.sensitivity,
        args.out.as_deref(),
    );
    spinner.finish_and_clear();

    match result? {
        None => anyhow::bail!("DIAMOND exited with a nonzero status; see diagnostics above"),
        Some(records) if records.is_empty() => {
            println!("{}", "No matches found.".yellow());
        }
        Some(records) => print_records(&records, args.json)?,
    }
    Ok(())
}

/// A single argument naming an existing file is treated as a query FASTA;
/// anything else is taken as raw amino acid sequences.
fn load_sequences(args: &[String]) -> Result<Vec<String>> {
    if args.len() == 1 {
        let path = PathBuf::from(&args[0]);
        if path.is_file() {
            let records = fasta::read_fasta(&path)
                .with_context(|| format!("failed to read query file {}", path.display()))?;
            if records.is_empty() {
                anyhow::bail!("no FASTA records found in {}", path.display());
            }
            return Ok(records.into_iter().map(|r| r.seq).collect());
        }
    }
    Ok(args.to_vec())
}

fn resolve_binary(diamond: PathBuf) -> Result<PathBuf> {
    if diamond.components().count() == 1 && !diamond.exists() {
        return which::which(&diamond).with_context(|| {
            format!("DIAMOND binary '{}' not found on PATH", diamond.display())
        });
    }
    Ok(diamond)
}

fn print_records(records: &[AlignmentRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    use crate::tools::diamond::ALIGNMENT_COLUMNS;
    println!("{}", ALIGNMENT_COLUMNS.join("\t"));
    for r in records {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.query_accession,
            r.target_accession,
            r.percent_identity,
            r.alignment_length,
            r.mismatches,
            r.gap_openings,
            r.query_start,
            r.query_end,
            r.target_start,
            r.target_end,
            r.e_value,
            r.bit_score,
        );
    }
    Ok(())
}
