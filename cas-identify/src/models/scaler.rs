//! Fitted scaling transforms applied to feature vectors before prediction.
//!
//! Parameters were fixed at training time; this module only replays them.

use serde::{Deserialize, Serialize};

use crate::models::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// z-score with per-feature mean and scale (standard deviation)
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// per-feature (v - min) / scale, scale = max - min at fit time
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    pub fn n_features(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
        }
    }

    /// transform one vector in place
    pub fn transform(&self, row: &mut [f64]) -> Result<(), ModelError> {
        if row.len() != self.n_features() {
            return Err(ModelError::Dimension {
                expected: self.n_features(),
                got: row.len(),
            });
        }

        match self {
            Self::Standard { mean, scale } => {
                for (v, (m, s)) in row.iter_mut().zip(mean.iter().zip(scale)) {
                    // constant feature at fit time maps to 0
                    *v = if *s == 0.0 { 0.0 } else { (*v - m) / s };
                }
            }
            Self::MinMax { min, scale } => {
                for (v, (lo, s)) in row.iter_mut().zip(min.iter().zip(scale)) {
                    *v = if *s == 0.0 { 0.0 } else { (*v - lo) / s };
                }
            }
        }

        Ok(())
    }

    /// transform a whole run's batch of vectors in place
    pub fn transform_batch(&self, rows: &mut [Vec<f64>]) -> Result<(), ModelError> {
        for row in rows {
            self.transform(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_transform() {
        let scaler = Scaler::Standard {
            mean: vec![1.0, 10.0],
            scale: vec![2.0, 5.0],
        };

        let mut row = vec![3.0, 5.0];
        scaler.transform(&mut row).unwrap();

        assert!((row[0] - 1.0).abs() < 1e-12);
        assert!((row[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = Scaler::MinMax {
            min: vec![0.0],
            scale: vec![4.0],
        };

        let mut row = vec![1.0];
        scaler.transform(&mut row).unwrap();
        assert!((row[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let scaler = Scaler::Standard {
            mean: vec![5.0],
            scale: vec![0.0],
        };

        let mut row = vec![7.0];
        scaler.transform(&mut row).unwrap();
        assert_eq!(row[0], 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = Scaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };

        let mut row = vec![1.0];
        assert!(matches!(
            scaler.transform(&mut row),
            Err(ModelError::Dimension {
                expected: 2,
                got: 1
            })
        ));
    }
}
