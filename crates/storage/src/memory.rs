use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use pastelite_common::StoreError;

use crate::entry::Paste;
use crate::store::{PasteStore, decode_record, encode_record};

/// Backend in-memory. Guarda o texto codificado, como os backends de rede,
/// para que registros corrompidos se comportem da mesma forma.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grava texto cru numa chave, sem passar pelo encoder.
    pub fn insert_raw(&self, key: &str, raw: &str) {
        self.data.insert(key.to_string(), raw.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl PasteStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Paste>, StoreError> {
        let Some(raw) = self.data.get(key).map(|r| r.value().clone()) else {
            debug!("GET {key}: ausente");
            return Ok(None);
        };
        Ok(decode_record(key, &raw))
    }

    async fn set(&self, key: &str, paste: &Paste) -> Result<(), StoreError> {
        let raw = encode_record(paste)?;
        self.data.insert(key.to_string(), raw);
        debug!("SET {key}");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let existed = self.data.remove(key).is_some();
        debug!("DEL {key}: {}", if existed { "removida" } else { "ausente" });
        Ok(())
    }

    async fn probe(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
