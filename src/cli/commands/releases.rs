use anyhow::Result;
use clap::Args;
use colored::*;

use crate::remote::ensembl::EnsemblCatalog;

#[derive(Args)]
pub struct ReleasesArgs {
    /// Print releases as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ReleasesArgs) -> Result<()> {
    let catalog = EnsemblCatalog::new()?;
    let releases = catalog.list_releases()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&releases)?);
        return Ok(());
    }

    for release in &releases {
        println!("release-{release}");
    }
    if let Some(latest) = releases.last() {
        println!("{} release-{latest}", "Latest:".green().bold());
    }
    Ok(())
}
