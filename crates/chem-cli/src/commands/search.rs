//! `search` subcommand: filters previously ingested molecules (spec §4.2),
//! or runs a fingerprint similarity / substructure search over the
//! Fingerprint Index (spec §4.3) when `--similar-to`/`--substructure-of` is
//! given.

use std::sync::Arc;

use chem_domain::{FingerprintParameters, FingerprintType, Pagination, SimilarityMetric};
use chem_engine::ChemEngine;
use chem_persistence::{FingerprintIndex, MoleculeFilter, MoleculeSort, MoleculeStore, PgFingerprintIndex, PgMoleculeStore};

use crate::cli::SearchArgs;
use crate::error::CliError;

pub async fn run(args: SearchArgs,
                  store: Arc<PgMoleculeStore>,
                  fingerprints: Arc<PgFingerprintIndex>)
                  -> Result<(), CliError> {
    if let Some(query_smiles) = args.similar_to.clone() {
        return run_similarity_search(args, store, fingerprints, query_smiles).await;
    }
    if let Some(pattern) = args.substructure_of.clone() {
        return run_substructure_search(args, store, fingerprints, pattern).await;
    }

    let criteria =
        MoleculeFilter { smiles_contains: args.smiles_contains, formula_contains: args.formula_contains, ..Default::default() };
    let pagination = Pagination::new(args.page, args.size);
    let page = store.filter(criteria, pagination, MoleculeSort::CreatedAtDesc).await?;

    println!("{} molecule(s), page {} of {}", page.total, page.page, page.pages.max(1));
    for molecule in &page.items {
        println!("{}  {}  {}  mw={:.2}  status={:?}",
                 molecule.id, molecule.smiles, molecule.formula, molecule.molecular_weight, molecule.status);
    }
    Ok(())
}

async fn run_similarity_search(args: SearchArgs,
                                store: Arc<PgMoleculeStore>,
                                fingerprints: Arc<PgFingerprintIndex>,
                                query_smiles: String)
                                -> Result<(), CliError> {
    let engine = ChemEngine::global()?;
    let query_fp = engine.fingerprint(&query_smiles, FingerprintType::Morgan, &FingerprintParameters::morgan_default())?;

    let hits = fingerprints.similarity_search(&query_fp.data,
                                               FingerprintType::Morgan,
                                               SimilarityMetric::Tanimoto,
                                               args.threshold,
                                               args.size)
                            .await?;

    println!("{} similar molecule(s) (threshold={:.2})", hits.len(), args.threshold);
    for hit in &hits {
        let molecule = store.get(hit.molecule_id).await?;
        println!("{}  {}  score={:.4}", molecule.id, molecule.smiles, hit.score);
    }
    Ok(())
}

async fn run_substructure_search(args: SearchArgs,
                                  store: Arc<PgMoleculeStore>,
                                  fingerprints: Arc<PgFingerprintIndex>,
                                  pattern_smarts: String)
                                  -> Result<(), CliError> {
    let engine = ChemEngine::global()?;
    let candidates = fingerprints.candidate_smiles_for_substructure_search(args.size * 50).await?;

    let mut matched = Vec::new();
    for (molecule_id, smiles) in candidates {
        if engine.has_substructure(&smiles, &pattern_smarts)? {
            matched.push((molecule_id, smiles));
            if matched.len() as u32 >= args.size {
                break;
            }
        }
    }

    println!("{} molecule(s) containing '{}'", matched.len(), pattern_smarts);
    for (molecule_id, _) in &matched {
        let molecule = store.get(*molecule_id).await?;
        println!("{}  {}  {}", molecule.id, molecule.smiles, molecule.formula);
    }
    Ok(())
}
