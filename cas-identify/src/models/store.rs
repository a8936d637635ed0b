//! Artifact store: one lookup-by-key operation over the trained model set.

use dashmap::DashMap;
use hashbrown::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing model artifact: {0}")]
    MissingArtifact(String),
    #[error("failed to decode model artifact {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("feature vector has {got} slots, model expects {expected}")]
    Dimension { expected: usize, got: usize },
    #[error("class index {0} out of range for encoder with {1} classes")]
    UnknownClass(usize, usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// addresses one artifact of one profile set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactKey {
    Features(String),
    Scaler(String),
    Encoder(String),
    /// (profile set, classifier model name)
    Classifier(String, String),
    /// (profile set, regressor model name, feature name)
    Regressor(String, String, String),
}

impl ArtifactKey {
    /// file name under the models directory, mirrors the trained artifact layout
    pub fn file_name(&self) -> String {
        match self {
            Self::Features(set) => format!("{}_features.json", set),
            Self::Scaler(set) => format!("{}_scaler.json", set),
            Self::Encoder(set) => format!("{}_encoder.json", set),
            Self::Classifier(set, name) => format!("{}_{}.json", set, name),
            Self::Regressor(set, name, feature) => {
                format!("{}_{}_{}.json", set, name, feature)
            }
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

pub trait ArtifactStore: Sync {
    fn fetch(&self, key: &ArtifactKey) -> Result<Arc<Vec<u8>>, ModelError>;
}

/// directory-backed store with a read-mostly byte cache; artifacts are
/// immutable so cached entries are shared across runs
pub struct FsStore {
    dir: PathBuf,
    cache: DashMap<ArtifactKey, Arc<Vec<u8>>>,
}

impl FsStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            cache: DashMap::new(),
        }
    }
}

impl ArtifactStore for FsStore {
    fn fetch(&self, key: &ArtifactKey) -> Result<Arc<Vec<u8>>, ModelError> {
        if let Some(bytes) = self.cache.get(key) {
            return Ok(Arc::clone(&bytes));
        }

        let path = self.dir.join(key.file_name());
        if !path.is_file() {
            return Err(ModelError::MissingArtifact(key.to_string()));
        }

        let bytes = Arc::new(std::fs::read(&path)?);
        self.cache.insert(key.clone(), Arc::clone(&bytes));

        Ok(bytes)
    }
}

/// in-memory store, lets tests mock the artifact set
#[derive(Default)]
pub struct MemStore {
    blobs: HashMap<ArtifactKey, Arc<Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ArtifactKey, bytes: Vec<u8>) {
        self.blobs.insert(key, Arc::new(bytes));
    }
}

impl ArtifactStore for MemStore {
    fn fetch(&self, key: &ArtifactKey) -> Result<Arc<Vec<u8>>, ModelError> {
        self.blobs
            .get(key)
            .cloned()
            .ok_or_else(|| ModelError::MissingArtifact(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_key_file_names() {
        assert_eq!(
            ArtifactKey::Features("HMM1".into()).file_name(),
            "HMM1_features.json"
        );
        assert_eq!(
            ArtifactKey::Classifier("HMM3".into(), "SVC".into()).file_name(),
            "HMM3_SVC.json"
        );
        assert_eq!(
            ArtifactKey::Regressor("HMM5".into(), "SVR".into(), "cas9".into()).file_name(),
            "HMM5_SVR_cas9.json"
        );
    }

    #[test]
    fn test_fs_store_fetch_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let key = ArtifactKey::Features("HMM1".into());

        let mut file = std::fs::File::create(dir.path().join(key.file_name())).unwrap();
        write!(file, r#"["cas3"]"#).unwrap();

        let store = FsStore::new(dir.path().to_path_buf());
        let first = store.fetch(&key).unwrap();
        let second = store.fetch(&key).unwrap();

        assert_eq!(first.as_slice(), br#"["cas3"]"#);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_fs_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());

        let err = store
            .fetch(&ArtifactKey::Encoder("HMM4".into()))
            .unwrap_err();

        assert!(matches!(err, ModelError::MissingArtifact(k) if k == "HMM4_encoder.json"));
    }
}
