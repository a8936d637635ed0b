//! Trained model artifacts: lookup, decoding and inference.
//!
//! All models are pre-trained and read-only. They are fetched from an
//! [`store::ArtifactStore`] by exact key and deserialized from JSON; a
//! missing key is a fatal configuration error, never retried.

use serde::de::DeserializeOwned;

pub mod encoder;
pub mod scaler;
pub mod store;
pub mod tree;

pub use encoder::LabelEncoder;
pub use scaler::Scaler;
pub use store::{ArtifactKey, ArtifactStore, FsStore, MemStore, ModelError};
pub use tree::{ClassifierModel, RegressorModel};

fn decode<T: DeserializeOwned>(
    store: &dyn ArtifactStore,
    key: ArtifactKey,
) -> Result<T, ModelError> {
    let bytes = store.fetch(&key)?;
    serde_json::from_slice(&bytes).map_err(|source| ModelError::Decode {
        key: key.to_string(),
        source,
    })
}

/// ordered feature-name list for one profile set
pub fn load_features(store: &dyn ArtifactStore, set: &str) -> Result<Vec<String>, ModelError> {
    decode(store, ArtifactKey::Features(set.to_owned()))
}

pub fn load_scaler(store: &dyn ArtifactStore, set: &str) -> Result<Scaler, ModelError> {
    decode(store, ArtifactKey::Scaler(set.to_owned()))
}

pub fn load_encoder(store: &dyn ArtifactStore, set: &str) -> Result<LabelEncoder, ModelError> {
    decode(store, ArtifactKey::Encoder(set.to_owned()))
}

pub fn load_classifier(
    store: &dyn ArtifactStore,
    set: &str,
    name: &str,
) -> Result<ClassifierModel, ModelError> {
    decode(store, ArtifactKey::Classifier(set.to_owned(), name.to_owned()))
}

pub fn load_regressor(
    store: &dyn ArtifactStore,
    set: &str,
    name: &str,
    feature: &str,
) -> Result<RegressorModel, ModelError> {
    decode(
        store,
        ArtifactKey::Regressor(set.to_owned(), name.to_owned(), feature.to_owned()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_features_roundtrip() {
        let mut store = MemStore::new();
        store.insert(
            ArtifactKey::Features("HMM1".into()),
            br#"["cas1", "cas2", "cas9"]"#.to_vec(),
        );

        let features = load_features(&store, "HMM1").unwrap();
        assert_eq!(features, vec!["cas1", "cas2", "cas9"]);
    }

    #[test]
    fn test_missing_artifact_names_key() {
        let store = MemStore::new();
        let err = load_features(&store, "HMM2").unwrap_err();

        match err {
            ModelError::MissingArtifact(key) => assert_eq!(key, "HMM2_features.json"),
            _ => panic!("expected MissingArtifact, got {:?}", err),
        }
    }

    #[test]
    fn test_decode_error_names_key() {
        let mut store = MemStore::new();
        store.insert(ArtifactKey::Scaler("HMM1".into()), b"not json".to_vec());

        let err = load_scaler(&store, "HMM1").unwrap_err();
        assert!(err.to_string().contains("HMM1_scaler.json"));
    }
}
