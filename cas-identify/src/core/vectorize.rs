//! Feature Vectorizer: one fixed-length numeric vector per cascade.

use hashbrown::HashMap;

use crate::core::cascade::CascadeRecord;
use crate::core::records::GeneTable;
use crate::models::{ModelError, Scaler};

/// scaled feature vectors for one profile-set run, in cascade-id order
#[derive(Debug, Clone)]
pub struct RunVectors {
    pub features: Vec<String>,
    pub vectors: Vec<Vec<f64>>,
    /// per-cascade count of genes annotated "unknown"
    pub missing: Vec<usize>,
}

/// build one vector per cascade and apply the run's fitted scaling transform.
///
/// A slot holds the best bitscore of its family within the cascade, 0.0 when
/// the family is absent. Zero doubles as the "no evidence" sentinel, which a
/// genuine zero bitscore cannot be told apart from; the trained artifacts
/// assume this representation.
pub fn vectorize(
    table: &GeneTable,
    cascades: &[CascadeRecord],
    features: Vec<String>,
    scaler: &Scaler,
) -> Result<RunVectors, ModelError> {
    let feature_to_idx: HashMap<&str, usize> = features
        .iter()
        .enumerate()
        .map(|(i, f)| (f.as_str(), i))
        .collect();

    let mut vectors: Vec<Vec<f64>> = Vec::new();
    let mut missing: Vec<usize> = Vec::new();
    let mut current_id = 0;

    for member in cascades {
        if member.cascade_id != current_id {
            current_id = member.cascade_id;
            vectors.push(vec![0.0; features.len()]);
            missing.push(0);
        }

        let record = match table.get(member.record) {
            Some(r) => r,
            None => continue,
        };

        let vector = match vectors.last_mut() {
            Some(v) => v,
            None => continue,
        };

        if !record.is_annotated() {
            if let Some(m) = missing.last_mut() {
                *m += 1;
            }
            continue;
        }

        if let Some(&slot) = feature_to_idx.get(record.annotation.as_str()) {
            // duplicate family hits within one cascade keep the best score
            vector[slot] = vector[slot].max(record.bitscore);
        }
    }
    drop(feature_to_idx);

    scaler.transform_batch(&mut vectors)?;

    Ok(RunVectors {
        features,
        vectors,
        missing,
    })
}
