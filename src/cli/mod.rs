pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "iris",
    version,
    about = "Protein homology search and annotation retrieval for DIAMOND workflows",
    long_about = "Iris wraps the DIAMOND protein aligner and the UniProt/Ensembl catalogs \
                  behind one command line: align query sequences against a reference, map \
                  Ensembl identifiers to UniProt records, and browse Ensembl releases and \
                  their databases."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align query protein sequences against a reference with DIAMOND
    Align(commands::align::AlignArgs),

    /// Map Ensembl identifiers to UniProt records
    Map(commands::map::MapArgs),

    /// List available Ensembl releases
    Releases(commands::releases::ReleasesArgs),

    /// List species or database directories for an Ensembl release
    Databases(commands::databases::DatabasesArgs),
}
