use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::FetchError;
use crate::record::Vertical;
use crate::store::{Document, DocumentStore, parse_page};

/// Document store backed by one JSON file per collection under `data_dir`.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    data_dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.json"))
    }

    /// Collections with no file on disk.
    pub fn missing_collections(&self) -> Vec<&'static str> {
        Vertical::ALL
            .into_iter()
            .map(Vertical::collection)
            .filter(|c| !file_present_nonempty(&self.collection_path(c)))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, FetchError> {
        if collection.is_empty() || collection.contains(['/', '\\', '.']) {
            return Err(FetchError::UnknownCollection(collection.to_string()));
        }
        let path = self.collection_path(collection);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| FetchError::Decode {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?;
        Ok(parse_page(collection, value)?.documents)
    }
}

pub fn file_present_nonempty(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(m) => m.is_file() && m.len() > 0,
        Err(_) => false,
    }
}
