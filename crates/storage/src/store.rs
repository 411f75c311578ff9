use async_trait::async_trait;
use tracing::warn;

use pastelite_common::StoreError;

use crate::entry::Paste;

/// Capacidade comum a todos os backends: get/set/delete/probe.
///
/// Contrato:
/// - `get` de chave ausente é `Ok(None)`; registro corrompido também.
/// - `set` grava o snapshot inteiro, substituindo o valor anterior.
/// - `delete` é idempotente.
/// - `probe` precisa tocar o backend de verdade.
#[async_trait]
pub trait PasteStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Paste>, StoreError>;

    async fn set(&self, key: &str, paste: &Paste) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn probe(&self) -> Result<(), StoreError>;

    /// Nome do backend, para logs.
    fn name(&self) -> &'static str;
}

/// Decodifica um registro textual. Falha de decode vira ausência.
pub(crate) fn decode_record(key: &str, raw: &str) -> Option<Paste> {
    match Paste::from_json(raw) {
        Ok(paste) => Some(paste),
        Err(e) => {
            warn!("registro corrompido em {key} tratado como ausente: {e}");
            None
        }
    }
}

pub(crate) fn encode_record(paste: &Paste) -> Result<String, StoreError> {
    paste.to_json().map_err(|e| StoreError::Encode(e.to_string()))
}
