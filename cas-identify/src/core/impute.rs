//! Missing-Feature Imputer: fills zero-valued slots from per-feature
//! regression models, highest-confidence predictions first.

use log::{info, warn};

use config::MISSING_WARN_THRESHOLD;

use crate::models::{load_regressor, ArtifactStore, ModelError};

/// one filled slot, kept for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedSlot {
    pub index: usize,
    pub feature: String,
    pub value: f64,
}

/// fill up to `missing` zero slots of `vector` using `(set, regressor,
/// feature)` models; returns the filled copy plus the imputation record.
///
/// Zero is the "no evidence" sentinel, so a legitimate zero bitscore is
/// treated as missing as well. With missing == 0 the vector passes through
/// unchanged.
pub fn impute(
    vector: &[f64],
    missing: usize,
    features: &[String],
    store: &dyn ArtifactStore,
    set: &str,
    regressor: &str,
    cascade_id: usize,
) -> Result<(Vec<f64>, Vec<ImputedSlot>), ModelError> {
    let mut filled = vector.to_vec();

    match missing {
        0 => {
            info!("no unlabeled proteins for cascade #{} and {}", cascade_id, set);
            return Ok((filled, Vec::new()));
        }
        1 => info!("1 unlabeled protein for cascade #{} and {}", cascade_id, set),
        n => info!(
            "{} unlabeled proteins for cascade #{} and {}",
            n, cascade_id, set
        ),
    }

    if missing > MISSING_WARN_THRESHOLD {
        warn!(
            "more than {} missing proteins in cascade #{}, predictions will likely be weak",
            MISSING_WARN_THRESHOLD, cascade_id
        );
    }

    let mut predictions: Vec<ImputedSlot> = Vec::new();

    for (slot, feature) in features.iter().enumerate() {
        match vector.get(slot) {
            Some(value) if *value == 0.0 => {}
            _ => continue,
        }

        let model = load_regressor(store, set, regressor, feature)?;

        // the regression input is the vector with the candidate slot removed
        let mut reduced = Vec::with_capacity(vector.len().saturating_sub(1));
        reduced.extend_from_slice(&vector[..slot]);
        reduced.extend_from_slice(&vector[slot + 1..]);

        predictions.push(ImputedSlot {
            index: slot,
            feature: feature.clone(),
            value: model.predict(&reduced),
        });
    }

    // higher predicted bitscore = more confident
    predictions.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    predictions.truncate(missing.min(predictions.len()));

    for (rank, slot) in predictions.iter().enumerate() {
        info!(
            "{} missing bit-score prediction for cascade #{}, {} and {} ({}/{}): {:.3}",
            regressor,
            cascade_id,
            set,
            slot.feature,
            rank + 1,
            predictions.len(),
            slot.value
        );
        filled[slot.index] = slot.value;
    }

    Ok((filled, predictions))
}
