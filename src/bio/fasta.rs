//! Minimal FASTA reading and writing for staging aligner queries.
//!
//! The parser is intentionally permissive: it is used for small query files
//! and reference header checks, not for ingesting whole databases.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::Result;

/// A single FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub seq: String,
}

/// Parse FASTA text into records.
///
/// Lines starting with `>` open a new record; everything up to the first
/// whitespace becomes the id. All other lines are appended to the current
/// sequence with surrounding whitespace trimmed.
pub fn parse_fasta(text: &str) -> Vec<FastaRecord> {
    let mut records = Vec::new();
    let mut id: Option<String> = None;
    let mut seq = String::new();

    for line in text.lines() {
        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = id.take() {
                records.push(FastaRecord { id, seq: std::mem::take(&mut seq) });
            }
            id = Some(
                header
                    .trim()
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            );
        } else if id.is_some() {
            seq.push_str(line.trim());
        }
    }
    if let Some(id) = id {
        records.push(FastaRecord { id, seq });
    }

    records
}

/// Read and parse a FASTA file.
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_fasta(&text))
}

/// Write records to `path` in FASTA format.
pub fn write_fasta(path: &Path, records: &[FastaRecord]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    for record in records {
        writeln!(file, ">{}", record.id)?;
        writeln!(file, "{}", record.seq)?;
    }
    Ok(())
}
