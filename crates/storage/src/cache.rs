use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pastelite_common::{DEFAULT_CACHE_PORT, StoreError};
use pastelite_protocol::{Command, Frame};

use crate::connection::Connection;
use crate::entry::Paste;
use crate::store::{PasteStore, decode_record, encode_record};

/// Parâmetros de conexão com o servidor de cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db: Option<i64>,
    pub timeout: Duration,
}

impl CacheConfig {
    /// Interpreta `redis://[[user]:password@]host[:port][/db]`.
    pub fn from_url(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let rest = url
            .strip_prefix("redis://")
            .ok_or_else(|| StoreError::Config(format!("URL de cache não suportada: {url}")))?;

        let (userinfo, hostpart) = match rest.rsplit_once('@') {
            Some((info, host)) => (Some(info), host),
            None => (None, rest),
        };

        let (username, password) = match userinfo {
            Some(info) => match info.split_once(':') {
                Some((user, pass)) => (
                    (!user.is_empty()).then(|| user.to_string()),
                    Some(pass.to_string()),
                ),
                None => (None, Some(info.to_string())),
            },
            None => (None, None),
        };

        let (addr, db) = match hostpart.split_once('/') {
            Some((addr, "")) => (addr, None),
            Some((addr, db)) => {
                let db = db
                    .parse::<i64>()
                    .map_err(|_| StoreError::Config(format!("database inválido: '{db}'")))?;
                (addr, Some(db))
            }
            None => (hostpart, None),
        };

        let (host, port) = match addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| StoreError::Config(format!("porta inválida: '{port}'")))?;
                (host, port)
            }
            None => (addr, DEFAULT_CACHE_PORT),
        };

        if host.is_empty() {
            return Err(StoreError::Config(format!("host ausente em {url}")));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            username,
            password,
            db,
            timeout,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Backend sobre um servidor de cache que fala RESP (Redis e compatíveis).
///
/// A conexão é aberta no primeiro uso e reaproveitada. Qualquer erro de
/// conexão ou de protocolo descarta a conexão e sobe para quem chamou; a
/// próxima chamada reconecta.
pub struct CacheStore {
    config: CacheConfig,
    conn: Mutex<Option<Connection>>,
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        info!("backend de cache: {}", config.addr());
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    async fn connect(&self) -> Result<Connection, StoreError> {
        let addr = self.config.addr();
        let stream = tokio::time::timeout(self.config.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| timed_out("connect"))??;
        let mut conn = Connection::new(stream);

        if let Some(password) = &self.config.password {
            let auth = Command::Auth {
                username: self.config.username.clone(),
                password: password.clone(),
            };
            self.handshake(&mut conn, &auth).await?;
        }
        if let Some(db) = self.config.db {
            self.handshake(&mut conn, &Command::Select(db)).await?;
        }

        info!("conectado ao servidor de cache {addr}");
        Ok(conn)
    }

    /// Comando de abertura de conexão, com o mesmo limite de tempo das demais chamadas.
    async fn handshake(&self, conn: &mut Connection, cmd: &Command) -> Result<(), StoreError> {
        let reply = tokio::time::timeout(self.config.timeout, conn.request(cmd))
            .await
            .map_err(|_| timed_out(cmd.name()))??;
        expect_ok(reply)
    }

    /// Executa um comando na conexão compartilhada. Respostas de erro do
    /// servidor viram `StoreError::Remote` sem derrubar a conexão.
    async fn call(&self, cmd: Command) -> Result<Frame, StoreError> {
        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => self.connect().await?,
        };

        let reply = match tokio::time::timeout(self.config.timeout, conn.request(&cmd)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!("{} falhou, descartando conexão: {e}", cmd.name());
                return Err(e);
            }
            Err(_) => {
                warn!("{} excedeu o timeout, descartando conexão", cmd.name());
                return Err(timed_out(cmd.name()));
            }
        };
        *guard = Some(conn);

        match reply {
            Frame::Error(msg) => Err(StoreError::Remote(msg)),
            reply => Ok(reply),
        }
    }
}

#[async_trait]
impl PasteStore for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<Paste>, StoreError> {
        match self.call(Command::Get(key.to_string())).await? {
            Frame::Null => {
                debug!("GET {key}: ausente");
                Ok(None)
            }
            reply => match reply.as_text() {
                Some(raw) => Ok(decode_record(key, raw)),
                None => {
                    warn!("valor não textual em {key} tratado como ausente");
                    Ok(None)
                }
            },
        }
    }

    async fn set(&self, key: &str, paste: &Paste) -> Result<(), StoreError> {
        let value = encode_record(paste)?;
        let reply = self
            .call(Command::Set {
                key: key.to_string(),
                value,
            })
            .await?;
        expect_ok(reply)?;
        debug!("SET {key}");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self.call(Command::Del(vec![key.to_string()])).await? {
            Frame::Integer(n) => {
                debug!("DEL {key}: {n} removida(s)");
                Ok(())
            }
            other => Err(unexpected(&other)),
        }
    }

    async fn probe(&self) -> Result<(), StoreError> {
        match self.call(Command::Ping(None)).await? {
            Frame::Simple(s) if s == "PONG" => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    fn name(&self) -> &'static str {
        "cache"
    }
}

fn expect_ok(reply: Frame) -> Result<(), StoreError> {
    match reply {
        Frame::Simple(s) if s == "OK" => Ok(()),
        Frame::Error(msg) => Err(StoreError::Remote(msg)),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(frame: &Frame) -> StoreError {
    StoreError::UnexpectedReply(format!("{frame:?}"))
}

fn timed_out(op: &str) -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("{op} excedeu o timeout"),
    ))
}
