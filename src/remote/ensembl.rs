//! Ensembl FTP catalog listings: releases and per-release species/database
//! directories.
//!
//! The FTP front-end serves plain HTML directory listings, so the lookups
//! here fetch a page, pull anchor hrefs out of it, and filter the names by
//! the requested axis. The parsing functions are pure so they can be tested
//! against fixture listings without a network.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use reqwest::blocking::Client;
use serde::Serialize;

use super::{build_client, rest_query, RestResponse};
use crate::{IrisError, Result};

/// Root of the Ensembl FTP site.
pub const ENSEMBL_FTP_URL: &str = "http://ftp.ensembl.org/pub/";

/// Category of genomic data directory being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogAxis {
    Dna,
    Cdna,
    Gtf,
    Core,
}

impl CatalogAxis {
    /// Subdirectory listed for this axis under a release.
    fn subdir(&self) -> &'static str {
        match self {
            CatalogAxis::Dna | CatalogAxis::Cdna => "fasta",
            CatalogAxis::Gtf => "gtf",
            CatalogAxis::Core => "mysql",
        }
    }
}

impl FromStr for CatalogAxis {
    type Err = IrisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dna" => Ok(CatalogAxis::Dna),
            "cdna" => Ok(CatalogAxis::Cdna),
            "gtf" => Ok(CatalogAxis::Gtf),
            "core" => Ok(CatalogAxis::Core),
            _ => Err(IrisError::InvalidInput(format!("unknown catalog axis: {s}"))),
        }
    }
}

impl fmt::Display for CatalogAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogAxis::Dna => "dna",
            CatalogAxis::Cdna => "cdna",
            CatalogAxis::Gtf => "gtf",
            CatalogAxis::Core => "core",
        };
        write!(f, "{name}")
    }
}

/// A directory name from an Ensembl listing, tagged with the release and
/// axis it was retrieved under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub release: u32,
    pub axis: CatalogAxis,
}

/// Client for the Ensembl FTP catalog.
pub struct EnsemblCatalog {
    client: Client,
    base_url: String,
}

impl EnsemblCatalog {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: ENSEMBL_FTP_URL.to_string(),
        })
    }

    /// Point the catalog at a different listing root (used by tests and
    /// mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch_listing(&self, url: &str) -> Result<String> {
        match rest_query(&self.client, url, "", "text/html")? {
            RestResponse::Text(text) => Ok(text),
            RestResponse::Json(_) => Err(IrisError::Parse(
                "expected an HTML directory listing, got JSON".to_string(),
            )),
        }
    }

    /// All release numbers advertised at the FTP root.
    pub fn list_releases(&self) -> Result<Vec<u32>> {
        let listing = self.fetch_listing(&self.base_url)?;
        let mut releases = parse_release_numbers(&listing);
        releases.sort_unstable();
        Ok(releases)
    }

    /// The highest release number advertised at the FTP root.
    pub fn latest_release(&self) -> Result<u32> {
        self.list_releases()?
            .into_iter()
            .max()
            .ok_or_else(|| {
                IrisError::Parse(
                    "no release directories found in the Ensembl FTP listing".to_string(),
                )
            })
    }

    /// Directory names for `axis` under `release` (latest when `None`).
    ///
    /// A requested release newer than the latest available is rejected
    /// before any further network call.
    pub fn list_databases(
        &self,
        release: Option<u32>,
        axis: CatalogAxis,
    ) -> Result<Vec<CatalogEntry>> {
        let latest = self.latest_release()?;
        let release = resolve_release(release, latest)?;

        let url = format!("{}release-{release}/{}/", self.base_url, axis.subdir());
        let listing = self.fetch_listing(&url)?;
        Ok(parse_axis_entries(&listing, axis)
            .into_iter()
            .map(|name| CatalogEntry { name, release, axis })
            .collect())
    }
}

/// Release numbers found in an FTP root listing (`release-<N>` hrefs).
pub fn parse_release_numbers(html: &str) -> Vec<u32> {
    let href = Regex::new(r#"href="release-(\d+)/?""#).expect("static pattern compiles");
    href.captures_iter(html)
        .filter_map(|cap| cap[1].parse().ok())
        .collect()
}

/// Validate a caller-supplied release against the latest available one.
pub fn resolve_release(requested: Option<u32>, latest: u32) -> Result<u32> {
    match requested {
        Some(release) if release > latest => Err(IrisError::InvalidInput(format!(
            "requested Ensembl release {release} is greater than the latest release {latest}"
        ))),
        Some(release) => Ok(release),
        None => Ok(latest),
    }
}

/// Directory names in an axis listing, filtered to entries that belong to
/// the requested axis. Navigation links (parent directories, column-sort
/// queries) are dropped.
pub fn parse_axis_entries(html: &str, axis: CatalogAxis) -> Vec<String> {
    let href = Regex::new(r#"href="([^"]+)""#).expect("static pattern compiles");
    href.captures_iter(html)
        .filter_map(|cap| {
            let target = cap[1].trim_end_matches('/');
            let name = target.split('/').next_back().unwrap_or_default();
            if name.is_empty()
                || name == ".."
                || name.starts_with('?')
                || target.contains("://")
            {
                return None;
            }
            match axis {
                CatalogAxis::Core if !name.contains("core") => None,
                _ => Some(name.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROOT_LISTING: &str = r#"
        <html><body><pre>
        <a href="../">../</a>
        <a href="release-100/">release-100/</a>
        <a href="release-99/">release-99/</a>
        <a href="release-7/">release-7/</a>
        <a href="?C=M;O=A">sort</a>
        </pre></body></html>
    "#;

    #[test]
    fn latest_release_is_the_numeric_maximum() {
        let releases = parse_release_numbers(ROOT_LISTING);
        assert_eq!(releases.iter().max(), Some(&100));
    }

    #[test]
    fn release_numbers_compare_numerically_not_lexically() {
        // "7" > "99" as strings; as numbers 99 wins.
        let releases = parse_release_numbers(r#"<a href="release-7/"><a href="release-99/">"#);
        assert_eq!(releases.iter().max(), Some(&99));
    }

    #[test]
    fn requested_release_above_latest_is_rejected() {
        let err = resolve_release(Some(101), 100).unwrap_err();
        assert!(err.to_string().contains("101"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn requested_release_at_or_below_latest_passes() {
        assert_eq!(resolve_release(Some(99), 100).unwrap(), 99);
        assert_eq!(resolve_release(Some(100), 100).unwrap(), 100);
        assert_eq!(resolve_release(None, 100).unwrap(), 100);
    }

    #[test]
    fn core_axis_filters_to_core_databases() {
        let listing = r#"
            <a href="../">../</a>
            <a href="homo_sapiens_core_110_38/">x</a>
            <a href="homo_sapiens_funcgen_110_38/">x</a>
            <a href="mus_musculus_core_110_39/">x</a>
        "#;
        let names = parse_axis_entries(listing, CatalogAxis::Core);
        assert_eq!(
            names,
            vec!["homo_sapiens_core_110_38", "mus_musculus_core_110_39"]
        );
    }

    #[test]
    fn species_axes_keep_all_directories() {
        let listing = r#"
            <a href="../">../</a>
            <a href="homo_sapiens/">x</a>
            <a href="mus_musculus/">x</a>
        "#;
        let names = parse_axis_entries(listing, CatalogAxis::Dna);
        assert_eq!(names, vec!["homo_sapiens", "mus_musculus"]);
    }

    #[test]
    fn navigation_links_are_dropped() {
        let listing = r#"<a href="?C=N;O=D">name</a><a href="http://example.org/x/">x</a>"#;
        assert!(parse_axis_entries(listing, CatalogAxis::Gtf).is_empty());
    }

    #[test]
    fn axis_round_trips_through_from_str() {
        for name in ["dna", "cdna", "gtf", "core"] {
            let axis: CatalogAxis = name.parse().unwrap();
            assert_eq!(axis.to_string(), name);
        }
        assert!("protein".parse::<CatalogAxis>().is_err());
    }
}
