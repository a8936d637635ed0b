//! Classification Dispatcher: applies trained classifiers to the run's
//! feature vectors and accumulates prediction records.

use config::classifier_name;

use crate::models::{load_classifier, ArtifactStore, LabelEncoder, ModelError};

#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Single(String),
    /// (label, probability) pairs, probability descending
    Ranked(Vec<(String, f64)>),
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(name) => write!(f, "{}", name),
            Self::Ranked(pairs) => {
                let joined = pairs
                    .iter()
                    .map(|(name, prob)| format!("{} ({:.3})", name, prob))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", joined)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub hmm: String,
    pub cascade_id: usize,
    /// short classifier name (CART, ERT, SVM)
    pub classifier: String,
    /// short regressor name when imputation filled the vector
    pub regressor: Option<String>,
    pub label: Label,
}

/// classify every vector of one run with every requested classifier
pub fn classify_run(
    vectors: &[Vec<f64>],
    store: &dyn ArtifactStore,
    set: &str,
    classifiers: &[String],
    encoder: &LabelEncoder,
    probability: bool,
    regressor: Option<&str>,
) -> Result<Vec<Prediction>, ModelError> {
    let mut predictions = Vec::with_capacity(vectors.len() * classifiers.len());

    for (ci, vector) in vectors.iter().enumerate() {
        for short in classifiers {
            // startup validation guarantees the short name is known
            let name = classifier_name(short).unwrap_or(short.as_str());
            let model = load_classifier(store, set, name)?;

            let label = if probability {
                ranked_label(&model.predict_proba(vector), encoder)?
            } else {
                Label::Single(encoder.decode(model.predict(vector))?.to_owned())
            };

            predictions.push(Prediction {
                hmm: set.to_owned(),
                cascade_id: ci + 1,
                classifier: short.clone(),
                regressor: regressor.map(str::to_owned),
                label,
            });
        }
    }

    Ok(predictions)
}

/// keep strictly positive probabilities, decode and sort descending; the
/// sort is stable so equal probabilities keep encoder order
fn ranked_label(probs: &[f64], encoder: &LabelEncoder) -> Result<Label, ModelError> {
    let mut pairs: Vec<(String, f64)> = Vec::new();

    for (idx, &prob) in probs.iter().enumerate() {
        if prob > 0.0 {
            pairs.push((encoder.decode(idx)?.to_owned(), prob));
        }
    }

    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(Label::Ranked(pairs))
}
