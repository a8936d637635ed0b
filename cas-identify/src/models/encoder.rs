//! Label encoder: encoded class index -> human-readable system-type name.

use serde::{Deserialize, Serialize};

use crate::models::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn decode(&self, idx: usize) -> Result<&str, ModelError> {
        self.classes
            .get(idx)
            .map(String::as_str)
            .ok_or(ModelError::UnknownClass(idx, self.classes.len()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let encoder = LabelEncoder {
            classes: vec!["CAS-TypeIE".into(), "CAS-TypeIIA".into()],
        };

        assert_eq!(encoder.decode(1).unwrap(), "CAS-TypeIIA");
        assert!(matches!(
            encoder.decode(2),
            Err(ModelError::UnknownClass(2, 2))
        ));
    }
}
