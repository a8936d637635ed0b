//! Inference over pre-trained decision trees, tree ensembles and linear models.
//!
//! Trees are stored as a flat arena with index 0 as the root, which keeps the
//! walk allocation-free. Leaves carry per-class weights (classifiers) or a
//! single response value (regressors). No fitting happens here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// walk from the root to the leaf matching `sample`
    fn leaf_value(&self, sample: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if sample[*feature] <= *threshold {
                        idx = *left;
                    } else {
                        idx = *right;
                    }
                }
            }
        }
    }

    fn response(&self, sample: &[f64]) -> f64 {
        self.leaf_value(sample).first().copied().unwrap_or(0.0)
    }
}

/// normalize leaf class weights into a probability distribution
fn to_distribution(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter().map(|w| w / sum).collect()
    } else {
        weights.to_vec()
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// first index of the maximum probability; ties keep the earliest class
fn argmax(probs: &[f64]) -> usize {
    let mut best = 0;
    for (i, p) in probs.iter().enumerate() {
        if *p > probs[best] {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ClassifierModel {
    Tree { tree: DecisionTree },
    Forest { trees: Vec<DecisionTree> },
    Linear { coef: Vec<Vec<f64>>, intercept: Vec<f64> },
}

impl ClassifierModel {
    /// probability distribution over encoded classes
    pub fn predict_proba(&self, sample: &[f64]) -> Vec<f64> {
        match self {
            Self::Tree { tree } => to_distribution(tree.leaf_value(sample)),
            Self::Forest { trees } => {
                let mut acc: Vec<f64> = Vec::new();
                for tree in trees {
                    let probs = to_distribution(tree.leaf_value(sample));
                    if acc.is_empty() {
                        acc = probs;
                    } else {
                        for (a, p) in acc.iter_mut().zip(probs) {
                            *a += p;
                        }
                    }
                }
                let n = trees.len() as f64;
                acc.iter_mut().for_each(|a| *a /= n);
                acc
            }
            Self::Linear { coef, intercept } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, b)| dot(row, sample) + b)
                    .collect();
                softmax(&scores)
            }
        }
    }

    /// most likely encoded class; argmax of [`Self::predict_proba`], so
    /// single-label and ranked output always agree on the top label
    pub fn predict(&self, sample: &[f64]) -> usize {
        argmax(&self.predict_proba(sample))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RegressorModel {
    Tree { tree: DecisionTree },
    Forest { trees: Vec<DecisionTree> },
    Linear { coef: Vec<f64>, intercept: f64 },
}

impl RegressorModel {
    pub fn predict(&self, sample: &[f64]) -> f64 {
        match self {
            Self::Tree { tree } => tree.response(sample),
            Self::Forest { trees } => {
                if trees.is_empty() {
                    return 0.0;
                }
                trees.iter().map(|t| t.response(sample)).sum::<f64>() / trees.len() as f64
            }
            Self::Linear { coef, intercept } => dot(coef, sample) + intercept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn test_tree_walk() {
        let tree = stump(0.5, vec![3.0, 1.0], vec![0.0, 2.0]);

        assert_eq!(tree.leaf_value(&[0.0]), &[3.0, 1.0]);
        assert_eq!(tree.leaf_value(&[1.0]), &[0.0, 2.0]);
        // boundary goes left
        assert_eq!(tree.leaf_value(&[0.5]), &[3.0, 1.0]);
    }

    #[test]
    fn test_tree_classifier_proba() {
        let clf = ClassifierModel::Tree {
            tree: stump(0.5, vec![3.0, 1.0], vec![0.0, 2.0]),
        };

        let probs = clf.predict_proba(&[0.0]);
        assert!((probs[0] - 0.75).abs() < 1e-12);
        assert!((probs[1] - 0.25).abs() < 1e-12);
        assert_eq!(clf.predict(&[0.0]), 0);
        assert_eq!(clf.predict(&[1.0]), 1);
    }

    #[test]
    fn test_forest_averages() {
        let clf = ClassifierModel::Forest {
            trees: vec![
                stump(0.5, vec![1.0, 0.0], vec![0.0, 1.0]),
                stump(0.5, vec![0.0, 1.0], vec![0.0, 1.0]),
            ],
        };

        let probs = clf.predict_proba(&[0.0]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!((probs[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_linear_classifier() {
        let clf = ClassifierModel::Linear {
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            intercept: vec![0.0, 0.0],
        };

        let probs = clf.predict_proba(&[2.0, -2.0]);
        assert!(probs[0] > probs[1]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(clf.predict(&[2.0, -2.0]), 0);
    }

    #[test]
    fn test_regressors() {
        let reg = RegressorModel::Tree {
            tree: stump(1.0, vec![10.0], vec![20.0]),
        };
        assert_eq!(reg.predict(&[0.0]), 10.0);
        assert_eq!(reg.predict(&[2.0]), 20.0);

        let reg = RegressorModel::Forest {
            trees: vec![
                stump(1.0, vec![10.0], vec![20.0]),
                stump(1.0, vec![30.0], vec![40.0]),
            ],
        };
        assert_eq!(reg.predict(&[0.0]), 20.0);

        let reg = RegressorModel::Linear {
            coef: vec![2.0, 1.0],
            intercept: 0.5,
        };
        assert_eq!(reg.predict(&[1.0, 3.0]), 5.5);
    }

    #[test]
    fn test_json_decoding() {
        let json = r#"{
            "model": "tree",
            "tree": {
                "nodes": [
                    {"kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"kind": "leaf", "value": [1.0, 0.0]},
                    {"kind": "leaf", "value": [0.0, 1.0]}
                ]
            }
        }"#;

        let clf: ClassifierModel = serde_json::from_str(json).unwrap();
        assert_eq!(clf.predict(&[0.0]), 0);
    }

    #[test]
    fn test_argmax_tie_keeps_first() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
    }
}
