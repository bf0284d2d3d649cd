//! UniProt id-mapping client: Ensembl gene/transcript ids in, normalized
//! mapping records out.
//!
//! The mapping endpoint answers with tab-separated text whose shape varies
//! (6 or 7 columns, list-valued cells), so the raw body is pushed through
//! the tabular normalizer before any typed records are built. A single
//! query id may map to several UniProt entries; those rows are exploded so
//! downstream consumers always see one id per row.

use std::fmt;
use std::str::FromStr;

use reqwest::blocking::Client;
use serde::Serialize;

use super::{build_client, check_status};
use crate::parse::tabular::{explode, normalize_mapping, parse_with_header, Table};
use crate::{IrisError, Result};

/// UniProt id-mapping endpoint.
pub const UNIPROT_MAPPING_URL: &str = "https://www.uniprot.org/uploadlists/";

/// Canonical headers for the sequence-retrieval column set.
const SEQUENCE_HEADERS: [&str; 6] = [
    "uniprot_id",
    "gene_names",
    "organism",
    "sequence",
    "sequence_length",
    "query",
];

/// Canonical headers for the annotation-retrieval column set.
const ANNOTATION_HEADERS: [&str; 6] = [
    "uniprot_id",
    "primary_gene_name",
    "synonyms",
    "protein_names",
    "uniprot_description",
    "query",
];

/// Requested UniProt columns for each retrieval mode.
const SEQUENCE_COLUMNS: &str = "id,genes,organism,sequence,length";
const ANNOTATION_COLUMNS: &str = "id,genes(PREFERRED),genes,protein names,comment(FUNCTION)";

/// Which Ensembl namespace the query ids live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdType {
    Gene,
    Transcript,
}

impl IdType {
    fn namespace(&self) -> &'static str {
        match self {
            IdType::Gene => "ENSEMBL_ID",
            IdType::Transcript => "ENSEMBL_TRS_ID",
        }
    }
}

impl FromStr for IdType {
    type Err = IrisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gene" => Ok(IdType::Gene),
            "transcript" => Ok(IdType::Transcript),
            _ => Err(IrisError::InvalidInput(format!(
                "id type '{s}' was not recognized as either gene or transcript"
            ))),
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdType::Gene => write!(f, "gene"),
            IdType::Transcript => write!(f, "transcript"),
        }
    }
}

/// One UniProt entry mapped from a single query id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdMappingRecord {
    pub uniprot_id: String,
    pub gene_names: String,
    pub organism: String,
    pub sequence: String,
    pub sequence_length: u64,
    pub query: String,
}

/// One gene-name synonym for a mapped UniProt entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub uniprot_id: String,
    pub primary_gene_name: String,
    pub synonym: String,
    pub protein_names: String,
    pub uniprot_description: String,
    pub query: String,
}

/// Client for the UniProt id-mapping service.
pub struct UniProtMapper {
    client: Client,
    server: String,
}

impl UniProtMapper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            server: UNIPROT_MAPPING_URL.to_string(),
        })
    }

    /// Point the mapper at a different endpoint (used by tests and mirrors).
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Fetch UniProt sequences for Ensembl ids. `Ok(None)` means the query
    /// legitimately returned no matches.
    pub fn map_sequences(
        &self,
        ids: &[String],
        id_type: IdType,
    ) -> Result<Option<Vec<IdMappingRecord>>> {
        let raw = self.query_mapping(ids, id_type, SEQUENCE_COLUMNS)?;
        parse_sequence_mapping(&raw)
    }

    /// Fetch gene-name synonyms and descriptions for Ensembl ids.
    pub fn map_annotations(
        &self,
        ids: &[String],
        id_type: IdType,
    ) -> Result<Option<Vec<AnnotationRecord>>> {
        let raw = self.query_mapping(ids, id_type, ANNOTATION_COLUMNS)?;
        parse_annotation_mapping(&raw)
    }

    fn query_mapping(&self, ids: &[String], id_type: IdType, columns: &str) -> Result<String> {
        let params = [
            ("from", id_type.namespace().to_string()),
            ("to", "ACC".to_string()),
            ("format", "tab".to_string()),
            ("query", ids.join(" ")),
            ("columns", columns.to_string()),
        ];

        let response = self.client.post(&self.server).form(&params).send()?;
        check_status(response.status())?;
        response.text().map_err(Into::into)
    }
}

/// Normalize a raw sequence-retrieval response into typed records.
pub fn parse_sequence_mapping(raw: &str) -> Result<Option<Vec<IdMappingRecord>>> {
    let Some(table) = parse_with_header(raw, 0)? else {
        return Ok(None);
    };
    let table = normalize_mapping(table, &SEQUENCE_HEADERS)?;
    // One row per mapped query id.
    let table = explode(table, "query", &[','])?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let row = full_row(&table, row)?;
        records.push(IdMappingRecord {
            uniprot_id: row[0].clone(),
            gene_names: row[1].clone(),
            organism: row[2].clone(),
            sequence: row[3].clone(),
            sequence_length: parse_field(&row[4], "sequence_length")?,
            query: row[5].clone(),
        });
    }
    Ok(Some(records))
}

/// Normalize a raw annotation-retrieval response into typed records, one
/// per gene-name synonym.
pub fn parse_annotation_mapping(raw: &str) -> Result<Option<Vec<AnnotationRecord>>> {
    let Some(table) = parse_with_header(raw, 0)? else {
        return Ok(None);
    };
    let table = normalize_mapping(table, &ANNOTATION_HEADERS)?;
    let table = explode(table, "query", &[','])?;
    // Synonym lists are space-delimited.
    let table = explode(table, "synonyms", &[' '])?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let row = full_row(&table, row)?;
        records.push(AnnotationRecord {
            uniprot_id: row[0].clone(),
            primary_gene_name: row[1].clone(),
            synonym: row[2].clone(),
            protein_names: row[3].clone(),
            uniprot_description: row[4].clone(),
            query: row[5].clone(),
        });
    }
    Ok(Some(records))
}

fn full_row<'a>(table: &Table, row: &'a [String]) -> Result<&'a [String]> {
    if row.len() < table.headers.len() {
        return Err(IrisError::Parse(format!(
            "mapping row has {} fields, expected {}: {:?}",
            row.len(),
            table.headers.len(),
            row
        )));
    }
    Ok(row)
}

fn parse_field<T: FromStr>(value: &str, column: &str) -> Result<T> {
    value.parse().map_err(|_| {
        IrisError::Parse(format!("invalid value '{value}' in column {column}"))
    })
}
