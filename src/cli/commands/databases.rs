use anyhow::Result;
use clap::Args;
use colored::*;

use crate::remote::ensembl::{CatalogAxis, EnsemblCatalog};

#[derive(Args)]
pub struct DatabasesArgs {
    /// Category of directory to list
    #[arg(short, long)]
    pub axis: CatalogAxis,

    /// Ensembl release (defaults to the latest)
    #[arg(short, long)]
    pub release: Option<u32>,

    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DatabasesArgs) -> Result<()> {
    let catalog = EnsemblCatalog::new()?;
    let entries = catalog.list_databases(args.release, args.axis)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No matches found.".yellow());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", entry.name);
    }
    Ok(())
}
