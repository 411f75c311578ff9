use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use pastelite_common::{MAX_EXPIRES_AT_MS, PasteResult, StoreError, ValidationError};

use crate::entry::{Decision, Paste, PasteView, evaluate};
use crate::id::{generate_id, is_valid_id, paste_key};
use crate::store::PasteStore;

/// Corpo validado de uma criação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
}

impl NewPaste {
    /// Valida o corpo JSON de criação. Nada é coagido: `"60"` ou `1.5` em
    /// `ttl_seconds` são rejeitados. `null` conta como ausente.
    pub fn from_json(body: &[u8]) -> Result<NewPaste, ValidationError> {
        let value: JsonValue =
            serde_json::from_slice(body).map_err(|_| ValidationError::InvalidJson)?;
        let obj = value.as_object().ok_or(ValidationError::InvalidJson)?;

        let content = match obj.get("content") {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => return Err(ValidationError::MissingContent),
        };

        Ok(NewPaste {
            content,
            ttl_seconds: positive_int(obj.get("ttl_seconds"), ValidationError::InvalidTtl)?,
            max_views: positive_int(obj.get("max_views"), ValidationError::InvalidMaxViews)?,
        })
    }
}

fn positive_int(
    value: Option<&JsonValue>,
    err: ValidationError,
) -> Result<Option<u64>, ValidationError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) if n >= 1 => Ok(Some(n)),
            _ => Err(err),
        },
    }
}

/// Orquestra store + política de expiração. É a única porta de leitura:
/// a API JSON e a página HTML passam pelo mesmo [`PasteService::fetch`].
#[derive(Clone)]
pub struct PasteService {
    store: Arc<dyn PasteStore>,
}

impl PasteService {
    pub fn new(store: Arc<dyn PasteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PasteStore> {
        &self.store
    }

    /// Persiste uma entrada nova e retorna o identificador gerado.
    /// Recusa TTLs cuja expiração passaria de [`MAX_EXPIRES_AT_MS`].
    pub async fn create(&self, new: NewPaste, now: u64) -> PasteResult<String> {
        let paste = Paste::new(new.content, new.ttl_seconds, new.max_views, now);
        if let Some(ttl) = paste.ttl_seconds {
            let expires_at = ttl.checked_mul(1000).and_then(|ms| now.checked_add(ms));
            if !expires_at.is_some_and(|t| t <= MAX_EXPIRES_AT_MS) {
                return Err(ValidationError::TtlTooLarge.into());
            }
        }
        let id = generate_id();
        self.store.set(&paste_key(&id), &paste).await?;
        info!(
            "paste {id} criado (ttl={:?}, max_views={:?})",
            paste.ttl_seconds, paste.max_views
        );
        Ok(id)
    }

    /// Lê e consome uma visualização. `None` cobre ausente, expirado,
    /// esgotado, corrompido e backend inacessível, sem distinção.
    ///
    /// Não é transacional: get e set/delete são chamadas separadas, então
    /// leituras concorrentes do mesmo id podem perder um incremento.
    pub async fn fetch(&self, id: &str, now: u64) -> Option<PasteView> {
        if !is_valid_id(id) {
            return None;
        }
        let key = paste_key(id);

        let paste = match self.store.get(&key).await {
            Ok(Some(paste)) => paste,
            Ok(None) => return None,
            Err(e) => {
                warn!("GET {key} falhou no backend {}: {e}", self.store.name());
                return None;
            }
        };

        match evaluate(&paste, now) {
            Decision::Expired(reason) => {
                debug!("paste {id} expirado ({reason:?})");
                self.delete_quietly(&key).await;
                None
            }
            Decision::LastView(view) => {
                debug!("paste {id}: última visualização");
                self.delete_quietly(&key).await;
                Some(view)
            }
            Decision::Alive(view, updated) => {
                if let Err(e) = self.store.set(&key, &updated).await {
                    warn!("contador de {key} não persistido: {e}");
                }
                Some(view)
            }
        }
    }

    /// Liveness do backend ativo.
    pub async fn health(&self) -> Result<(), StoreError> {
        self.store.probe().await
    }

    async fn delete_quietly(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!("DEL {key} falhou: {e}");
        }
    }
}
