//! Subcommand definitions, grounded on `oolonek-lotus-o3`'s `clap::Parser`
//! derive usage.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "chem-cli", author, version, about = "Molecular ingestion and enrichment command line interface", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the CSV ingestion pipeline over a local file (spec §4.4).
    Ingest(IngestArgs),
    /// Filter previously ingested molecules (spec §4.2).
    Search(SearchArgs),
    /// Submit molecules for property prediction (spec §4.6).
    Predict(PredictArgs),
    /// Check the status of a prediction batch (spec §4.6).
    PredictStatus(PredictStatusArgs),
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to the CSV file to ingest.
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// User id the created molecules are attributed to.
    #[arg(long)]
    pub created_by: Uuid,

    /// Submit the newly created molecules for prediction once ingestion commits.
    #[arg(long, default_value_t = false)]
    pub enrich: bool,

    /// Properties to request when `--enrich` is set. Defaults to the full
    /// predictable set if omitted.
    #[arg(long, value_delimiter = ',')]
    pub properties: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(long)]
    pub smiles_contains: Option<String>,

    #[arg(long)]
    pub formula_contains: Option<String>,

    /// Run a fingerprint similarity search against this query SMILES instead
    /// of filtering the stored molecule attributes (spec §4.3).
    #[arg(long, conflicts_with = "substructure_of")]
    pub similar_to: Option<String>,

    /// Minimum Tanimoto similarity score, used with `--similar-to`.
    #[arg(long, default_value_t = 0.7)]
    pub threshold: f64,

    /// Run a substructure search for this SMARTS pattern instead of
    /// filtering the stored molecule attributes (spec §4.3).
    #[arg(long, conflicts_with = "similar_to")]
    pub substructure_of: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = chem_domain::pagination::DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Molecule ids to request predictions for.
    #[arg(long, value_delimiter = ',', required = true)]
    pub molecule_ids: Vec<Uuid>,

    /// Properties to predict; each must be in the predictable set.
    #[arg(long, value_delimiter = ',', required = true)]
    pub properties: Vec<String>,

    /// User id the batch is attributed to.
    #[arg(long)]
    pub created_by: Uuid,
}

#[derive(Args, Debug)]
pub struct PredictStatusArgs {
    pub batch_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_requires_file_and_created_by() {
        let err = Cli::try_parse_from(["chem-cli", "ingest"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn ingest_parses_enrich_and_property_list() {
        let cli = Cli::parse_from(["chem-cli", "ingest", "--file", "molecules.csv", "--created-by",
                                    "11111111-1111-1111-1111-111111111111", "--enrich", "--properties",
                                    "logp,solubility"]);
        let Command::Ingest(args) = cli.command else { panic!("expected Ingest") };
        assert!(args.enrich);
        assert_eq!(args.properties, vec!["logp".to_string(), "solubility".to_string()]);
    }

    #[test]
    fn predict_status_parses_positional_batch_id() {
        let cli = Cli::parse_from(["chem-cli", "predict-status", "11111111-1111-1111-1111-111111111111"]);
        assert!(matches!(cli.command, Command::PredictStatus(_)));
    }
}
