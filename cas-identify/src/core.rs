//! Pipeline orchestration: annotation -> cascade detection -> vectorization
//! -> optional imputation -> classification.
//!
//! Profile-set runs own disjoint tables, hit directories and artifacts, so
//! they fan out over the rayon pool; everything inside one run is strictly
//! sequential because the cascade scan is order-dependent. Results are
//! re-sorted afterwards so the output order is deterministic.

use anyhow::Result;
use log::info;
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

use config::{
    get_progress_bar, regressor_name, RunMode, ANNOTATED_SUFFIX, ARRAY_SUFFIX, CASCADE_SUFFIX,
};

use crate::cli::Args;
use crate::core::cascade::CascadeParams;
use crate::core::classify::Prediction;
use crate::core::records::GeneTable;
use crate::core::vectorize::RunVectors;
use crate::models::{self, ArtifactStore, FsStore};
use crate::utils;

pub mod annotate;
pub mod cascade;
pub mod classify;
pub mod impute;
pub mod records;
pub mod vectorize;

/// input-format and upstream-contract violations; always fatal
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed header line in {file}: '{line}'")]
    MalformedHeader { file: String, line: String },
    #[error("malformed hit-table line in {file}: '{line}'")]
    MalformedHit { file: String, line: String },
    #[error("hit table {file} references unknown gene '{id}'")]
    UnknownGene { id: String, file: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

struct RunOutput {
    hmm: String,
    vectors: RunVectors,
}

/// run the full pipeline; returns the path of the prediction table
pub fn identify(args: Args) -> Result<PathBuf> {
    let table = records::build_gene_table(&args.fasta, args.sequence_type)?;
    info!(
        "Built gene table with {} records from {:?}",
        table.len(),
        args.fasta
    );

    std::fs::create_dir_all(&args.cascade_dir)?;
    let store = FsStore::new(args.models_dir.clone());

    let pb = get_progress_bar(args.hmm_sets.len() as u64, "Processing profile sets...");

    let mut runs = args
        .hmm_sets
        .par_iter()
        .map(|hmm| {
            let run = process_run(hmm, &table, &args, &store);
            pb.inc(1);
            run
        })
        .collect::<Result<Vec<RunOutput>>>()?;

    pb.finish_and_clear();
    runs.sort_by(|a, b| a.hmm.cmp(&b.hmm));

    let mut predictions: Vec<Prediction> = Vec::new();

    match args.mode {
        RunMode::Classification => {
            info!("Loading classifiers and running classification");
            for run in &runs {
                predictions.extend(classify_filled(&run.vectors.vectors, run, &store, &args, None)?);
            }
        }
        RunMode::Regression | RunMode::Mixed => {
            for reg in &args.regressors {
                for run in &runs {
                    let filled = impute_run(run, &store, reg)?;

                    if args.mode == RunMode::Mixed {
                        predictions.extend(classify_filled(&filled, run, &store, &args, Some(reg))?);
                    }
                }
            }
        }
    }

    sort_predictions(&mut predictions, &args.classifiers, &args.regressors);
    utils::write_predictions(&args.output, &predictions)?;
    info!("Saved class predictions to {:?}", args.output);

    Ok(args.output)
}

/// one profile-set run: annotate, detect cascades, vectorize, persist
fn process_run(hmm: &str, table: &GeneTable, args: &Args, store: &FsStore) -> Result<RunOutput> {
    let mut run_table = table.clone();

    annotate::annotate(&mut run_table, &args.hmm_dir.join(hmm), args.sequence_type)?;
    utils::write_annotated_table(
        &args.cascade_dir.join(format!("{}{}", hmm, ANNOTATED_SUFFIX)),
        &run_table,
        args.sequence_type,
    )?;

    let params = CascadeParams {
        max_gap: args.max_gap,
        min_proteins: args.min_proteins,
        max_nt_diff: args.max_nt_diff,
    };
    let cascades = cascade::detect_cascades(&run_table, args.sequence_type, params);
    utils::write_cascade_table(
        &args.cascade_dir.join(format!("{}{}", hmm, CASCADE_SUFFIX)),
        &run_table,
        &cascades,
        args.sequence_type,
    )?;

    let features = models::load_features(store, hmm)?;
    let scaler = models::load_scaler(store, hmm)?;
    let vectors = vectorize::vectorize(&run_table, &cascades, features, &scaler)?;

    let array_path = args.cascade_dir.join(format!("{}{}", hmm, ARRAY_SUFFIX));
    info!("Saving cascade arrays to {:?}", array_path);
    utils::write_feature_matrix(&array_path, &vectors.features, &vectors.vectors)?;

    Ok(RunOutput {
        hmm: hmm.to_owned(),
        vectors,
    })
}

/// impute every cascade of one run with one regressor
fn impute_run(run: &RunOutput, store: &dyn ArtifactStore, reg: &str) -> Result<Vec<Vec<f64>>> {
    let reg_name = regressor_name(reg).unwrap_or(reg);
    let mut filled = Vec::with_capacity(run.vectors.vectors.len());

    for (ci, vector) in run.vectors.vectors.iter().enumerate() {
        let (vector, _slots) = impute::impute(
            vector,
            run.vectors.missing[ci],
            &run.vectors.features,
            store,
            &run.hmm,
            reg_name,
            ci + 1,
        )?;
        filled.push(vector);
    }

    Ok(filled)
}

fn classify_filled(
    vectors: &[Vec<f64>],
    run: &RunOutput,
    store: &dyn ArtifactStore,
    args: &Args,
    regressor: Option<&str>,
) -> Result<Vec<Prediction>> {
    let encoder = models::load_encoder(store, &run.hmm)?;

    let predictions = classify::classify_run(
        vectors,
        store,
        &run.hmm,
        &args.classifiers,
        &encoder,
        args.probability,
        regressor,
    )?;

    Ok(predictions)
}

/// deterministic output order: profile-set ascending, cascade ascending,
/// classifier in configured order, regressor in configured order
fn sort_predictions(predictions: &mut [Prediction], classifiers: &[String], regressors: &[String]) {
    let position = |list: &[String], value: &str| -> usize {
        list.iter().position(|v| v == value).unwrap_or(list.len())
    };

    predictions.sort_by(|a, b| {
        a.hmm
            .cmp(&b.hmm)
            .then(a.cascade_id.cmp(&b.cascade_id))
            .then(position(classifiers, &a.classifier).cmp(&position(classifiers, &b.classifier)))
            .then(
                a.regressor
                    .as_deref()
                    .map(|r| position(regressors, r))
                    .cmp(&b.regressor.as_deref().map(|r| position(regressors, r))),
            )
    });
}
