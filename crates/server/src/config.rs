use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use pastelite_common::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STORE_FILE};
use pastelite_storage::{BackendConfig, BackendKind};

#[derive(Parser, Debug)]
#[command(
    name = "pastelite-server",
    about = "pastelite — pastes efêmeros com TTL e limite de visualizações"
)]
pub struct Args {
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Base das URLs devolvidas na criação. Sem ela, usa o header Host.
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,
    #[arg(long, env = "KV_REST_API_URL")]
    pub kv_rest_api_url: Option<String>,
    #[arg(long, env = "KV_REST_API_TOKEN", hide_env_values = true)]
    pub kv_rest_api_token: Option<String>,
    #[arg(long, env = "REDIS_URL", hide_env_values = true)]
    pub redis_url: Option<String>,
    #[arg(long, env = "PASTELITE_STORE_PATH", value_name = "FILE", default_value = DEFAULT_STORE_FILE)]
    pub store_path: PathBuf,
    /// Força um backend: file, rest, cache, memory.
    #[arg(long, env = "PASTELITE_BACKEND")]
    pub backend: Option<BackendKind>,
    /// Aceita o header x-test-now-ms como relógio. Nunca ligar em produção.
    #[arg(long, env = "TEST_MODE", action = clap::ArgAction::Set, default_value = "0", value_parser = parse_flag)]
    pub test_mode: bool,
    #[arg(long, env = "PASTELITE_REQUEST_TIMEOUT_MS", default_value_t = 5_000)]
    pub request_timeout_ms: u64,
}

fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("valor inválido: '{s}'. Use: 1, 0, true, false")),
    }
}

/// Configuração da camada HTTP.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub addr: String,
    pub public_base_url: Option<String>,
    pub test_mode: bool,
}

impl Args {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: format!("{}:{}", self.host, self.port),
            public_base_url: self
                .public_base_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(normalize_base_url),
            test_mode: self.test_mode,
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            rest_url: self.kv_rest_api_url.clone(),
            rest_token: self.kv_rest_api_token.clone(),
            cache_url: self.redis_url.clone(),
            file_path: self.store_path.clone(),
            force: self.backend,
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

/// Remove a barra final e assume https quando o esquema foi omitido.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
