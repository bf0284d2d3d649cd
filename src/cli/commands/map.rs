use anyhow::Result;
use clap::Args;
use colored::*;

use crate::remote::uniprot::{IdType, UniProtMapper, UNIPROT_MAPPING_URL};

#[derive(Args)]
pub struct MapArgs {
    /// Ensembl gene or transcript identifiers
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Identifier namespace the ids belong to
    #[arg(long, default_value = "transcript")]
    pub id_type: IdType,

    /// Fetch gene-name synonyms and descriptions instead of sequences
    #[arg(long)]
    pub info: bool,

    /// UniProt id-mapping endpoint
    #[arg(long, default_value = UNIPROT_MAPPING_URL)]
    pub server: String,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MapArgs) -> Result<()> {
    let mapper = UniProtMapper::new()?.with_server(args.server);

    if args.info {
        match mapper.map_annotations(&args.ids, args.id_type)? {
            None => println!("{}", "No matches found.".yellow()),
            Some(records) if args.json => {
                println!("{}", serde_json::to_string_pretty(&records)?)
            }
            Some(records) => {
                println!("uniprot_id\tprimary_gene_name\tsynonym\tprotein_names\tuniprot_description\tquery");
                for r in &records {
                    println!(
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        r.uniprot_id,
                        r.primary_gene_name,
                        r.synonym,
                        r.protein_names,
                        r.uniprot_description,
                        r.query,
                    );
                }
            }
        }
        return Ok(());
    }

    match mapper.map_sequences(&args.ids, args.id_type)? {
        None => println!("{}", "No matches found.".yellow()),
        Some(records) if args.json => println!("{}", serde_json::to_string_pretty(&records)?),
        Some(records) => {
            println!("uniprot_id\tgene_names\torganism\tsequence\tsequence_length\tquery");
            for r in &records {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    r.uniprot_id, r.gene_names, r.organism, r.sequence, r.sequence_length, r.query,
                );
            }
        }
    }
    Ok(())
}
