//! Normalization of tab-separated responses into tabular records.
//!
//! The remote mapping endpoint and the aligner both hand back TSV text, but
//! with different shapes: the aligner output is headerless with a fixed
//! column set, mapping responses carry a header row and may grow an extra
//! trailing column, and one annotation export prefixes the header with a
//! fixed-length preamble. Everything funnels through [`Table`] here so the
//! callers only ever see the canonical schema.

use tracing::warn;

use crate::{IrisError, Result};

/// Number of non-tabular preamble lines before the header row in the
/// fixed-format annotation export (the ELM instances TSV).
pub const ANNOTATION_EXPORT_PREAMBLE_LINES: usize = 5;

/// A parsed tab-separated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Parse TSV text into a [`Table`].
///
/// With `headers`, the text is assumed to be headerless and the given names
/// are assigned positionally (the aligner output path). Without `headers`,
/// a header row is expected after [`ANNOTATION_EXPORT_PREAMBLE_LINES`]
/// preamble lines.
///
/// Returns `Ok(None)` when the body holds no data rows at all; an empty
/// response is a normal outcome, not a parse failure.
pub fn parse_tsv(text: &str, headers: Option<&[&str]>) -> Result<Option<Table>> {
    match headers {
        Some(names) => parse_headerless(text, names),
        None => parse_with_header(text, ANNOTATION_EXPORT_PREAMBLE_LINES),
    }
}

fn parse_headerless(text: &str, names: &[&str]) -> Result<Option<Table>> {
    let rows = data_rows(text.lines());
    if rows.is_empty() {
        warn!("query did not result in any matches");
        return Ok(None);
    }
    Ok(Some(Table {
        headers: names.iter().map(|n| n.to_string()).collect(),
        rows,
    }))
}

/// Parse TSV text whose header row follows `skip` preamble lines.
pub fn parse_with_header(text: &str, skip: usize) -> Result<Option<Table>> {
    let mut lines = text.lines().skip(skip).filter(|l| !l.trim().is_empty());
    let headers: Vec<String> = match lines.next() {
        Some(line) => line.split('\t').map(|h| h.trim().to_string()).collect(),
        None => {
            warn!("query did not result in any matches");
            return Ok(None);
        }
    };

    let rows = data_rows(lines);
    if rows.is_empty() {
        warn!("query did not result in any matches");
        return Ok(None);
    }
    Ok(Some(Table { headers, rows }))
}

fn data_rows<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<Vec<String>> {
    lines
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split('\t').map(str::to_string).collect())
        .collect()
}

/// The shapes the mapping endpoint is known to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSchema {
    /// Six columns mapping directly onto the canonical field set.
    Canonical,
    /// Seven columns: the canonical set plus a trailing isoform-map column.
    WithIsoforms,
}

impl MappingSchema {
    /// Pick a schema from the observed column count.
    pub fn detect(width: usize) -> Result<Self> {
        match width {
            6 => Ok(MappingSchema::Canonical),
            7 => Ok(MappingSchema::WithIsoforms),
            n => Err(IrisError::Parse(format!(
                "unexpected column count {n} in mapping response (expected 6 or 7)"
            ))),
        }
    }

    /// How many trailing columns to drop before renaming.
    pub fn trailing_drop(&self) -> usize {
        match self {
            MappingSchema::Canonical => 0,
            MappingSchema::WithIsoforms => 1,
        }
    }
}

/// Normalize a mapping table to the `canonical` header names, dropping the
/// trailing isoform column when present.
pub fn normalize_mapping(table: Table, canonical: &[&str]) -> Result<Table> {
    let schema = MappingSchema::detect(table.headers.len())?;
    let keep = table.headers.len() - schema.trailing_drop();
    if keep != canonical.len() {
        return Err(IrisError::Parse(format!(
            "cannot map {} columns onto {} canonical fields",
            keep,
            canonical.len()
        )));
    }

    let rows = table
        .rows
        .into_iter()
        .map(|mut row| {
            row.truncate(keep);
            row
        })
        .collect();

    Ok(Table {
        headers: canonical.iter().map(|n| n.to_string()).collect(),
        rows,
    })
}

/// Split the list-valued cells of `column` and emit one row per token, with
/// every other field duplicated. Rows whose cell holds a single token pass
/// through unchanged.
pub fn explode(table: Table, column: &str, delimiters: &[char]) -> Result<Table> {
    let idx = table.column_index(column).ok_or_else(|| {
        IrisError::Parse(format!("no column named '{column}' to explode"))
    })?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        if idx >= row.len() {
            rows.push(row);
            continue;
        }
        let tokens: Vec<String> = row[idx]
            .split(|c| delimiters.contains(&c))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tokens.len() <= 1 {
            rows.push(row);
            continue;
        }
        for token in tokens {
            let mut out = row.clone();
            out[idx] = token;
            rows.push(out);
        }
    }

    Ok(Table { headers: table.headers, rows })
}
