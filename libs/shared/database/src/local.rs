use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Keyed JSON document store. Without a path it lives only in memory; with one,
/// every write rewrites the whole file (temporary file, then rename).
pub struct LocalStore {
    path: Option<PathBuf>,
    documents: RwLock<HashMap<String, Value>>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let documents: HashMap<String, Value> = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Corrupted local store at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Local store {} does not exist yet, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        debug!("Opened local store {} with {} keys", path.display(), documents.len());

        Ok(Self {
            path: Some(path),
            documents: RwLock::new(documents),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let documents = self.documents.read().await;
        match documents.get(key) {
            Some(value) => {
                let decoded = serde_json::from_value(value.clone())
                    .with_context(|| format!("Failed to decode document '{}'", key))?;
                Ok(Some(decoded))
            }
            None => Ok(None),
        }
    }

    pub async fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.documents.read().await.contains_key(key)
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)?;
        let mut documents = self.documents.write().await;
        self.commit(&mut documents, key, encoded).await
    }

    /// Read-modify-write of one document under the write lock. A missing
    /// document starts from `T::default()`; the result is always written back,
    /// and nothing changes in memory when the write to disk fails.
    pub async fn update<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> R,
    {
        let mut documents = self.documents.write().await;

        let mut current: T = match documents.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .with_context(|| format!("Failed to decode document '{}'", key))?,
            None => T::default(),
        };

        let result = f(&mut current);

        let encoded = serde_json::to_value(&current)?;
        self.commit(&mut documents, key, encoded).await?;

        Ok(result)
    }

    /// Stores one document and persists the map, restoring the previous
    /// document if persisting fails.
    async fn commit(
        &self,
        documents: &mut HashMap<String, Value>,
        key: &str,
        value: Value,
    ) -> Result<()> {
        let previous = documents.insert(key.to_string(), value);

        if let Err(e) = self.flush(documents).await {
            match previous {
                Some(previous) => documents.insert(key.to_string(), previous),
                None => documents.remove(key),
            };
            return Err(e);
        }

        Ok(())
    }

    async fn flush(&self, documents: &HashMap<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let bytes = serde_json::to_vec_pretty(documents)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    #[tokio::test]
    async fn update_starts_from_default_and_returns_closure_result() {
        let store = LocalStore::in_memory();

        let after = store
            .update::<Counter, _, _>("counter", |c| {
                c.hits += 1;
                c.hits
            })
            .await
            .unwrap();
        assert_eq!(after, 1);

        let stored: Counter = store.get_or_default("counter").await.unwrap();
        assert_eq!(stored, Counter { hits: 1 });
        assert!(!store.is_persistent());
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        {
            let store = LocalStore::open(&path).await.unwrap();
            store.set("solicitacoes", &vec!["a", "b"]).await.unwrap();
            store.set("chat:1", &vec!["oi"]).await.unwrap();
            assert!(store.is_persistent());
        }

        let reopened = LocalStore::open(&path).await.unwrap();
        let values: Vec<String> = reopened.get_or_default("solicitacoes").await.unwrap();
        assert_eq!(values, vec!["a".to_string(), "b".to_string()]);
        assert!(reopened.contains("chat:1").await);
        assert!(!reopened.contains("chat:2").await);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = LocalStore::open(&path).await.unwrap();
        store.set("solicitacoes", &vec!["nova"]).await.unwrap();

        // A directory where the temporary file should go makes every write fail.
        tokio::fs::create_dir(path.with_extension("json.tmp")).await.unwrap();

        let result = store
            .update::<Vec<String>, _, _>("solicitacoes", |v| v[0] = "aceita".to_string())
            .await;
        assert!(result.is_err());
        let values: Vec<String> = store.get_or_default("solicitacoes").await.unwrap();
        assert_eq!(values, vec!["nova".to_string()]);

        assert!(store.set("chat:1", &vec!["oi"]).await.is_err());
        assert!(!store.contains("chat:1").await);
    }

    #[tokio::test]
    async fn rejects_corrupted_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        assert!(LocalStore::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_updates_are_serialized() {
        let store = std::sync::Arc::new(LocalStore::in_memory());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update::<Counter, _, _>("counter", |c| c.hits += 1)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored: Counter = store.get_or_default("counter").await.unwrap();
        assert_eq!(stored.hits, 20);
    }
}
