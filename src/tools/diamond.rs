//! DIAMOND aligner integration.
//!
//! The invocation is a two-stage pipeline: `makedb` builds a searchable
//! index from the reference, then `blastp` searches the staged queries
//! against it. The stages run as separate processes (no shell string, so
//! user-controlled paths cannot inject into a command line) and stage two
//! never runs when stage one fails. DIAMOND's stderr is logged at warn
//! level regardless of exit status; its diagnostics are not necessarily
//! errors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::str::FromStr;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::parse::tabular::{parse_tsv, Table};
use crate::tools::workspace::RunWorkspace;
use crate::{IrisError, Result};

/// Fixed column order of DIAMOND's tabular output.
pub const ALIGNMENT_COLUMNS: [&str; 12] = [
    "query_accession",
    "target_accession",
    "percent_identity",
    "alignment_length",
    "mismatches",
    "gap_openings",
    "query_start",
    "query_end",
    "target_start",
    "target_end",
    "e_value",
    "bit_score",
];

/// DIAMOND sensitivity tier: speed traded against search thoroughness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sensitivity {
    Fast,
    MidSensitive,
    Sensitive,
    MoreSensitive,
    VerySensitive,
    UltraSensitive,
}

impl Sensitivity {
    /// Command-line flag for this tier.
    pub fn flag(&self) -> &'static str {
        match self {
            Sensitivity::Fast => "--fast",
            Sensitivity::MidSensitive => "--mid-sensitive",
            Sensitivity::Sensitive => "--sensitive",
            Sensitivity::MoreSensitive => "--more-sensitive",
            Sensitivity::VerySensitive => "--very-sensitive",
            Sensitivity::UltraSensitive => "--ultra-sensitive",
        }
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Sensitivity::VerySensitive
    }
}

impl FromStr for Sensitivity {
    type Err = IrisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Sensitivity::Fast),
            "mid-sensitive" => Ok(Sensitivity::MidSensitive),
            "sensitive" => Ok(Sensitivity::Sensitive),
            "more-sensitive" => Ok(Sensitivity::MoreSensitive),
            "very-sensitive" => Ok(Sensitivity::VerySensitive),
            "ultra-sensitive" => Ok(Sensitivity::UltraSensitive),
            _ => Err(IrisError::InvalidInput(format!("unknown sensitivity: {s}"))),
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag().trim_start_matches('-'))
    }
}

/// One row of DIAMOND's tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentRecord {
    pub query_accession: String,
    pub target_accession: String,
    pub percent_identity: f64,
    pub alignment_length: u64,
    pub mismatches: u64,
    pub gap_openings: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub target_start: u64,
    pub target_end: u64,
    pub e_value: f64,
    pub bit_score: f64,
}

/// DIAMOND aligner wrapper.
#[derive(Debug)]
pub struct DiamondAligner {
    binary_path: PathBuf,
    base_dir: PathBuf,
}

impl DiamondAligner {
    /// Wrap the DIAMOND binary at `binary_path`.
    pub fn new(binary_path: PathBuf) -> Result<Self> {
        if !binary_path.exists() {
            return Err(IrisError::InvalidInput(format!(
                "DIAMOND binary not found at {}",
                binary_path.display()
            )));
        }
        Ok(Self {
            binary_path,
            base_dir: PathBuf::from("."),
        })
    }

    /// Root temporary files somewhere other than the current working
    /// directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Align query sequences against a reference FASTA file.
    ///
    /// `Ok(None)` means DIAMOND exited nonzero; the diagnostics have
    /// already been logged and callers must check for the absent result.
    /// `Ok(Some(vec![]))` means the run succeeded but found no matches.
    /// Temporary files are removed on every exit path.
    pub fn align(
        &self,
        sequences: &[String],
        reference: &Path,
        sensitivity: Sensitivity,
        out: Option<&Path>,
    ) -> Result<Option<Vec<AlignmentRecord>>> {
        let workspace = RunWorkspace::in_dir(&self.base_dir);
        let result = self.run(&workspace, sequences, reference, sensitivity, out);
        if let Err(e) = workspace.cleanup() {
            warn!("failed to remove temporary files for run {}: {e}", workspace.id());
        }
        result
    }

    fn run(
        &self,
        workspace: &RunWorkspace,
        sequences: &[String],
        reference: &Path,
        sensitivity: Sensitivity,
        out: Option<&Path>,
    ) -> Result<Option<Vec<AlignmentRecord>>> {
        let input = workspace.stage(sequences)?;
        let output = out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| workspace.output_path());

        // Stage one: build the reference index.
        let makedb = Command::new(&self.binary_path)
            .arg("makedb")
            .arg("--quiet")
            .arg("--in")
            .arg(reference)
            .arg("-d")
            .arg(workspace.index_stem())
            .output()?;
        log_diagnostics("makedb", &makedb);
        if !makedb.status.success() {
            error!(
                "DIAMOND makedb failed with exit code {}",
                makedb.status.code().unwrap_or(-1)
            );
            return Ok(None);
        }

        // Stage two: search the staged queries against the index.
        let blastp = Command::new(&self.binary_path)
            .arg("blastp")
            .arg("--quiet")
            .arg("-q")
            .arg(&input)
            .arg("-d")
            .arg(workspace.index_stem())
            .arg("-o")
            .arg(&output)
            .arg(sensitivity.flag())
            .arg("--ignore-warnings")
            .output()?;
        log_diagnostics("blastp", &blastp);
        if !blastp.status.success() {
            error!(
                "DIAMOND blastp failed with exit code {}",
                blastp.status.code().unwrap_or(-1)
            );
            return Ok(None);
        }
        info!("DIAMOND run complete");

        let raw = fs::read_to_string(&output)?;
        match parse_tsv(&raw, Some(ALIGNMENT_COLUMNS.as_slice()))? {
            Some(table) => Ok(Some(records_from(&table)?)),
            // Zero alignments is a normal outcome, not a failure.
            None => Ok(Some(Vec::new())),
        }
    }
}

fn log_diagnostics(stage: &str, output: &Output) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        warn!("DIAMOND {stage}: {}", stderr.trim());
    }
}

/// Convert a parsed output table into typed records. Every row must carry
/// the full 12-field set; short rows are a malformed response.
fn records_from(table: &Table) -> Result<Vec<AlignmentRecord>> {
    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        if row.len() < ALIGNMENT_COLUMNS.len() {
            return Err(IrisError::Parse(format!(
                "alignment row has {} fields, expected {}: {:?}",
                row.len(),
                ALIGNMENT_COLUMNS.len(),
                row
            )));
        }
        records.push(AlignmentRecord {
            query_accession: row[0].clone(),
            target_accession: row[1].clone(),
            percent_identity: parse_field(&row[2], "percent_identity")?,
            alignment_length: parse_field(&row[3], "alignment_length")?,
            mismatches: parse_field(&row[4], "mismatches")?,
            gap_openings: parse_field(&row[5], "gap_openings")?,
            query_start: parse_field(&row[6], "query_start")?,
            query_end: parse_field(&row[7], "query_end")?,
            target_start: parse_field(&row[8], "target_start")?,
            target_end: parse_field(&row[9], "target_end")?,
            e_value: parse_field(&row[10], "e_value")?,
            bit_score: parse_field(&row[11], "bit_score")?,
        });
    }
    Ok(records)
}

fn parse_field<T: FromStr>(value: &str, column: &str) -> Result<T> {
    value.parse().map_err(|_| {
        IrisError::Parse(format!("invalid value '{value}' in column {column}"))
    })
}
