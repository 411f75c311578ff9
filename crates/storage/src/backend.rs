use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use pastelite_common::{DEFAULT_STORE_FILE, StoreError};

use crate::cache::{CacheConfig, CacheStore};
use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::rest::{RestConfig, RestKvStore};
use crate::store::PasteStore;

/// Backends disponíveis. Exatamente um fica ativo por processo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Rest,
    Cache,
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "rest" | "kv" => Ok(BackendKind::Rest),
            "cache" | "redis" => Ok(BackendKind::Cache),
            "memory" => Ok(BackendKind::Memory),
            _ => Err(format!(
                "valor inválido: '{s}'. Use: file, rest, cache, memory"
            )),
        }
    }
}

/// Configuração de conexão dos backends, resolvida uma vez na inicialização.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub rest_url: Option<String>,
    pub rest_token: Option<String>,
    pub cache_url: Option<String>,
    pub file_path: PathBuf,
    /// Força um backend específico em vez da detecção automática.
    pub force: Option<BackendKind>,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            rest_url: None,
            rest_token: None,
            cache_url: None,
            file_path: PathBuf::from(DEFAULT_STORE_FILE),
            force: None,
            timeout: Duration::from_secs(5),
        }
    }
}

impl BackendConfig {
    /// Qual backend fica ativo: override explícito, senão o primeiro cuja
    /// configuração de conexão está presente (REST, depois cache), senão arquivo.
    pub fn kind(&self) -> BackendKind {
        if let Some(kind) = self.force {
            return kind;
        }
        if present(&self.rest_url) && present(&self.rest_token) {
            BackendKind::Rest
        } else if present(&self.cache_url) {
            BackendKind::Cache
        } else {
            BackendKind::File
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn required(value: &Option<String>, name: &str) -> Result<String, StoreError> {
    value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StoreError::Config(format!("{name} não configurado")))
}

/// Constrói o backend ativo. Chamado uma única vez por processo.
pub fn open_store(config: &BackendConfig) -> Result<Arc<dyn PasteStore>, StoreError> {
    let kind = config.kind();
    info!("backend selecionado: {kind:?}");

    let store: Arc<dyn PasteStore> = match kind {
        BackendKind::Rest => Arc::new(RestKvStore::new(RestConfig {
            url: required(&config.rest_url, "KV_REST_API_URL")?,
            token: required(&config.rest_token, "KV_REST_API_TOKEN")?,
            timeout: config.timeout,
        })?),
        BackendKind::Cache => {
            let url = required(&config.cache_url, "REDIS_URL")?;
            Arc::new(CacheStore::new(CacheConfig::from_url(&url, config.timeout)?))
        }
        BackendKind::File => Arc::new(FileStore::new(config.file_path.clone())),
        BackendKind::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_file() {
        assert_eq!(BackendConfig::default().kind(), BackendKind::File);
    }

    #[test]
    fn rest_needs_url_and_token() {
        let config = BackendConfig {
            rest_url: Some("https://kv.example".into()),
            ..Default::default()
        };
        assert_eq!(config.kind(), BackendKind::File);

        let config = BackendConfig {
            rest_token: Some("t".into()),
            ..config
        };
        assert_eq!(config.kind(), BackendKind::Rest);
    }

    #[test]
    fn rest_wins_over_cache() {
        let config = BackendConfig {
            rest_url: Some("https://kv.example".into()),
            rest_token: Some("t".into()),
            cache_url: Some("redis://localhost".into()),
            ..Default::default()
        };
        assert_eq!(config.kind(), BackendKind::Rest);
    }

    #[test]
    fn cache_when_url_present() {
        let config = BackendConfig {
            cache_url: Some("redis://localhost".into()),
            ..Default::default()
        };
        assert_eq!(config.kind(), BackendKind::Cache);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let config = BackendConfig {
            cache_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(config.kind(), BackendKind::File);
    }

    #[test]
    fn force_overrides_detection() {
        let config = BackendConfig {
            cache_url: Some("redis://localhost".into()),
            force: Some(BackendKind::Memory),
            ..Default::default()
        };
        assert_eq!(config.kind(), BackendKind::Memory);
    }

    #[test]
    fn parse_kind() {
        assert_eq!("Redis".parse::<BackendKind>(), Ok(BackendKind::Cache));
        assert_eq!("memory".parse::<BackendKind>(), Ok(BackendKind::Memory));
        assert!("postgres".parse::<BackendKind>().is_err());
    }

    #[tokio::test]
    async fn forced_backend_without_connection_config_fails() {
        let config = BackendConfig {
            force: Some(BackendKind::Cache),
            ..Default::default()
        };
        assert!(matches!(open_store(&config), Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn open_store_builds_selected_backend() {
        let config = BackendConfig {
            force: Some(BackendKind::Memory),
            ..Default::default()
        };
        assert_eq!(open_store(&config).unwrap().name(), "memory");

        let config = BackendConfig {
            cache_url: Some("redis://127.0.0.1:1".into()),
            ..Default::default()
        };
        assert_eq!(open_store(&config).unwrap().name(), "cache");
    }
}
