use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use pastelite_common::StoreError;
use pastelite_protocol::Command;

use crate::entry::Paste;
use crate::store::{PasteStore, decode_record, encode_record};

/// Parâmetros do KV gerenciado acessado via REST.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

/// Corpo de resposta do KV: `{"result": ...}` ou `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<String>,
}

/// Backend sobre um KV gerenciado com API REST no formato Upstash: cada
/// comando vai num `POST` com o vetor de argumentos em JSON.
///
/// Uma requisição por operação, sem cache local.
pub struct RestKvStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl RestKvStore {
    pub fn new(config: RestConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("cliente HTTP: {e}")))?;
        let url = config.url.trim_end_matches('/').to_string();
        info!("backend REST: {url}");

        Ok(Self {
            client,
            url,
            token: config.token,
        })
    }

    async fn call(&self, cmd: Command) -> Result<JsonValue, StoreError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&cmd.args())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Http(format!("{} excedeu o timeout", cmd.name()))
                } else {
                    StoreError::Http(format!("{} falhou: {e}", cmd.name()))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let reply: RestReply = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(StoreError::Http(format!("HTTP {status}: {body}")));
            }
            Err(e) => return Err(StoreError::UnexpectedReply(e.to_string())),
        };

        if let Some(error) = reply.error {
            return Err(StoreError::Remote(error));
        }
        if !status.is_success() {
            return Err(StoreError::Http(format!("HTTP {status}")));
        }
        Ok(reply.result.unwrap_or(JsonValue::Null))
    }
}

#[async_trait]
impl PasteStore for RestKvStore {
    async fn get(&self, key: &str) -> Result<Option<Paste>, StoreError> {
        match self.call(Command::Get(key.to_string())).await? {
            JsonValue::Null => {
                debug!("GET {key}: ausente");
                Ok(None)
            }
            JsonValue::String(raw) => Ok(decode_record(key, &raw)),
            other => match serde_json::from_value::<Paste>(other) {
                Ok(paste) => Ok(Some(paste)),
                Err(e) => {
                    warn!("registro corrompido em {key} tratado como ausente: {e}");
                    Ok(None)
                }
            },
        }
    }

    async fn set(&self, key: &str, paste: &Paste) -> Result<(), StoreError> {
        let value = encode_record(paste)?;
        let result = self
            .call(Command::Set {
                key: key.to_string(),
                value,
            })
            .await?;
        match result.as_str() {
            Some("OK") => {
                debug!("SET {key}");
                Ok(())
            }
            _ => Err(StoreError::UnexpectedReply(result.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let result = self.call(Command::Del(vec![key.to_string()])).await?;
        match result.as_i64() {
            Some(n) => {
                debug!("DEL {key}: {n} removida(s)");
                Ok(())
            }
            None => Err(StoreError::UnexpectedReply(result.to_string())),
        }
    }

    async fn probe(&self) -> Result<(), StoreError> {
        let result = self.call(Command::Ping(None)).await?;
        match result.as_str() {
            Some("PONG") => Ok(()),
            _ => Err(StoreError::UnexpectedReply(result.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use dashmap::DashMap;
    use serde_json::json;
    use tokio::net::TcpListener;

    const TOKEN: &str = "test-token";

    type Data = Arc<DashMap<String, String>>;

    /// KV REST falso: interpreta o vetor de argumentos como o serviço real.
    async fn handle(
        State(data): State<Data>,
        headers: HeaderMap,
        Json(args): Json<Vec<String>>,
    ) -> (StatusCode, Json<JsonValue>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"));
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})));
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = match args.as_slice() {
            ["PING"] => json!("PONG"),
            ["GET", key] => match data.get(*key) {
                Some(v) => json!(v.value()),
                None => JsonValue::Null,
            },
            ["SET", key, value] => {
                data.insert(key.to_string(), value.to_string());
                json!("OK")
            }
            ["DEL", keys @ ..] => json!(keys.iter().filter(|k| data.remove(**k).is_some()).count()),
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "ERR unknown command"})),
                );
            }
        };
        (StatusCode::OK, Json(json!({ "result": result })))
    }

    async fn start_fake_kv() -> (String, Data) {
        let data: Data = Arc::new(DashMap::new());
        let app = Router::new()
            .route("/", post(handle))
            .with_state(data.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (url, data)
    }

    fn store(url: &str, token: &str) -> RestKvStore {
        RestKvStore::new(RestConfig {
            url: url.to_string(),
            token: token.to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn set_get_delete_roundtrip() {
        let (url, data) = start_fake_kv().await;
        let store = store(&url, TOKEN);
        let paste = Paste::new("hello\nworld".into(), None, Some(4), 99);

        store.set("paste:a", &paste).await.unwrap();
        assert!(data.get("paste:a").unwrap().contains("hello\\nworld"));
        assert_eq!(store.get("paste:a").await.unwrap(), Some(paste));

        store.delete("paste:a").await.unwrap();
        store.delete("paste:a").await.unwrap();
        assert_eq!(store.get("paste:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn probe_pings_the_service() {
        let (url, _) = start_fake_kv().await;
        store(&url, TOKEN).probe().await.unwrap();
    }

    #[tokio::test]
    async fn bad_token_surfaces_remote_error() {
        let (url, _) = start_fake_kv().await;
        let store = store(&url, "wrong");
        assert!(matches!(store.probe().await, Err(StoreError::Remote(_))));
        assert!(store.get("paste:a").await.is_err());
    }

    #[tokio::test]
    async fn corrupt_value_reads_as_absent() {
        let (url, data) = start_fake_kv().await;
        data.insert("paste:bad".into(), "[1,2".into());
        assert_eq!(store(&url, TOKEN).get("paste:bad").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let store = store(&format!("http://127.0.0.1:{port}"), TOKEN);
        assert!(matches!(store.probe().await, Err(StoreError::Http(_))));
    }
}
