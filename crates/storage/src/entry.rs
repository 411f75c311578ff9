use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use pastelite_common::MAX_EXPIRES_AT_MS;

/// Entrada persistida: conteúdo + metadados de expiração.
///
/// O identificador não faz parte do registro, ele é a própria chave
/// (`paste:<id>`). Campos opcionais ausentes no documento valem "não definido".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u64>,
    /// Milissegundos desde a epoch.
    pub created_at: u64,
    #[serde(default)]
    pub views: u64,
}

/// Motivo pelo qual uma entrada está morta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    Ttl,
    ViewLimit,
}

/// O que o leitor recebe de uma leitura bem-sucedida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteView {
    pub content: String,
    pub remaining_views: Option<u64>,
    /// Instante absoluto de expiração, em ms desde a epoch.
    pub expires_at_ms: Option<u64>,
}

/// Resultado de [`evaluate`] para uma tentativa de leitura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Entrada morta: apagar e responder not-found.
    Expired(ExpiryReason),
    /// Última visualização permitida: apagar, mas entregar o conteúdo.
    LastView(PasteView),
    /// Viva: persistir `updated` e entregar o conteúdo.
    Alive(PasteView, Paste),
}

impl Paste {
    pub fn new(
        content: String,
        ttl_seconds: Option<u64>,
        max_views: Option<u64>,
        created_at: u64,
    ) -> Self {
        Self {
            content,
            ttl_seconds,
            max_views,
            created_at,
            views: 0,
        }
    }

    /// Instante (ms) a partir do qual a entrada está morta por TTL.
    pub fn expires_at(&self) -> Option<u64> {
        self.ttl_seconds
            .map(|ttl| self.created_at.saturating_add(ttl.saturating_mul(1000)))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Paste, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl PasteView {
    /// `expires_at` em ISO-8601 UTC com milissegundos, ex. `2024-01-01T00:00:00.000Z`.
    /// Valores acima de [`MAX_EXPIRES_AT_MS`] saem limitados a ele.
    pub fn expires_at_iso(&self) -> Option<String> {
        let ms = self.expires_at_ms?.min(MAX_EXPIRES_AT_MS) as i64;
        DateTime::from_timestamp_millis(ms).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Decide se a entrada está viva em `now` e qual o estado pós-leitura.
///
/// Função pura: não faz I/O. TTL é checado antes do limite de views, e o
/// limite é comparado com o contador anterior ao incremento desta leitura.
pub fn evaluate(paste: &Paste, now: u64) -> Decision {
    if let Some(expires_at) = paste.expires_at()
        && now >= expires_at
    {
        return Decision::Expired(ExpiryReason::Ttl);
    }

    if let Some(max) = paste.max_views
        && paste.views >= max
    {
        return Decision::Expired(ExpiryReason::ViewLimit);
    }

    let next_views = paste.views.saturating_add(1);
    let view = PasteView {
        content: paste.content.clone(),
        remaining_views: paste.max_views.map(|max| max.saturating_sub(next_views)),
        expires_at_ms: paste.expires_at(),
    };

    match paste.max_views {
        Some(max) if next_views >= max => Decision::LastView(view),
        _ => {
            let updated = Paste {
                views: next_views,
                ..paste.clone()
            };
            Decision::Alive(view, updated)
        }
    }
}
