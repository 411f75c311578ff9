use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pastelite_common::StoreError;

use crate::entry::Paste;
use crate::store::PasteStore;

type Document = BTreeMap<String, JsonValue>;

/// Backend de arquivo único para uso local.
///
/// O arquivo é um documento JSON `chave -> entrada`. Toda operação lê o
/// documento inteiro, altera o mapa e reescreve o arquivo. O mutex só
/// serializa escritas dentro deste processo: dois processos apontando para o
/// mesmo arquivo podem perder atualizações um do outro.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("backend de arquivo: {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&data).map_err(|e| StoreError::CorruptDocument(e.to_string()))
    }

    /// Reescreve o documento via arquivo temporário + rename.
    async fn store(&self, doc: &Document) -> Result<(), StoreError> {
        let body =
            serde_json::to_string_pretty(doc).map_err(|e| StoreError::Encode(e.to_string()))?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PasteStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Paste>, StoreError> {
        let doc = match self.load().await {
            Ok(doc) => doc,
            Err(StoreError::CorruptDocument(e)) => {
                warn!("documento {} ilegível, GET {key} tratado como ausente: {e}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(value) = doc.get(key) else {
            debug!("GET {key}: ausente");
            return Ok(None);
        };

        match serde_json::from_value::<Paste>(value.clone()) {
            Ok(paste) => {
                debug!("GET {key}: encontrada");
                Ok(Some(paste))
            }
            Err(e) => {
                warn!("registro corrompido em {key} tratado como ausente: {e}");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, paste: &Paste) -> Result<(), StoreError> {
        let value = serde_json::to_value(paste).map_err(|e| StoreError::Encode(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        doc.insert(key.to_string(), value);
        self.store(&doc).await?;
        debug!("SET {key}");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        if doc.remove(key).is_some() {
            self.store(&doc).await?;
            debug!("DEL {key}: removida");
        } else {
            debug!("DEL {key}: ausente");
        }
        Ok(())
    }

    async fn probe(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::metadata(parent).await?;
        }
        self.load().await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("kv.json"))
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get("paste:a").await.unwrap(), None);
        store.probe().await.unwrap();
    }

    #[tokio::test]
    async fn set_get_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let paste = Paste::new("hello".into(), Some(60), Some(2), 10);
        store_in(&dir).set("paste:a", &paste).await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get("paste:a").await.unwrap(), Some(paste));
    }

    #[tokio::test]
    async fn document_is_a_readable_map() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .set("paste:a", &Paste::new("x".into(), None, None, 1))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let doc: JsonValue = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["paste:a"]["content"], "x");
        assert_eq!(doc["paste:a"]["views"], 0);
    }

    #[tokio::test]
    async fn delete_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let paste = Paste::new("x".into(), None, None, 1);
        store.set("paste:a", &paste).await.unwrap();
        store.set("paste:b", &paste).await.unwrap();

        store.delete("paste:a").await.unwrap();
        store.delete("paste:a").await.unwrap();
        store.delete("paste:never").await.unwrap();

        assert_eq!(store.get("paste:a").await.unwrap(), None);
        assert_eq!(store.get("paste:b").await.unwrap(), Some(paste));
    }

    #[tokio::test]
    async fn corrupt_record_is_absent_but_neighbours_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"paste:bad": {"content": 5}, "paste:ok": {"content": "y", "created_at": 1}}"#,
        )
        .unwrap();

        assert_eq!(store.get("paste:bad").await.unwrap(), None);
        assert_eq!(store.get("paste:ok").await.unwrap().unwrap().content, "y");
    }

    #[tokio::test]
    async fn corrupt_document_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ definitely not json").unwrap();

        assert_eq!(store.get("paste:a").await.unwrap(), None);
        let paste = Paste::new("x".into(), None, None, 1);
        assert!(matches!(
            store.set("paste:a", &paste).await,
            Err(StoreError::CorruptDocument(_))
        ));
        assert!(store.probe().await.is_err());
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "{ definitely not json"
        );
    }

    #[tokio::test]
    async fn probe_fails_without_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing").join("kv.json"));
        assert!(store.probe().await.is_err());
    }
}
