use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use pastelite_common::{DEFAULT_HOST, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(name = "pastelite-cli", about = "pastelite CLI client")]
struct Args {
    /// URL base do servidor.
    #[arg(long, env = "PASTELITE_URL", default_value_t = default_url())]
    url: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Cria um paste. Lê do stdin quando CONTENT é `-` ou omitido.
    Create {
        #[arg(long)]
        ttl: Option<u64>,
        #[arg(long)]
        max_views: Option<u64>,
        content: Option<String>,
    },
    /// Lê um paste, consumindo uma visualização.
    Get { id: String },
    /// Consulta /api/healthz.
    Health,
    /// Health, create e leitura de volta contra um servidor rodando.
    Smoke,
}

fn default_url() -> String {
    format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}")
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_views: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Fetched {
    content: String,
    remaining_views: Option<u64>,
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct Health {
    ok: bool,
}

struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn create(&self, req: &CreateRequest<'_>) -> anyhow::Result<Created> {
        let res = self
            .http
            .post(format!("{}/api/pastes", self.base))
            .json(req)
            .send()
            .await
            .with_context(|| format!("falha ao conectar em {}", self.base))?;
        if !res.status().is_success() {
            let status = res.status();
            let body: ErrorBody = res.json().await.context("resposta de erro inválida")?;
            bail!("HTTP {status}: {}", body.error);
        }
        Ok(res.json().await?)
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Fetched>> {
        let res = self
            .http
            .get(format!("{}/api/pastes/{id}", self.base))
            .send()
            .await
            .with_context(|| format!("falha ao conectar em {}", self.base))?;
        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(res.json().await?)),
            status => bail!("HTTP {status}"),
        }
    }

    async fn health(&self) -> anyhow::Result<bool> {
        let res = self
            .http
            .get(format!("{}/api/healthz", self.base))
            .send()
            .await
            .with_context(|| format!("falha ao conectar em {}", self.base))?;
        let health: Health = res.json().await?;
        Ok(health.ok)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let client = Client::new(&args.url);

    match args.command {
        Cmd::Create {
            ttl,
            max_views,
            content,
        } => {
            let content = match content.as_deref() {
                None | Some("-") => read_stdin()?,
                Some(text) => text.to_string(),
            };
            let created = client
                .create(&CreateRequest {
                    content: &content,
                    ttl_seconds: ttl,
                    max_views,
                })
                .await?;
            println!("{}", created.id);
            println!("{}", created.url);
        }
        Cmd::Get { id } => match client.get(&id).await? {
            Some(paste) => println!("{}", format_paste(&paste)),
            None => {
                println!("(not found)");
                return Ok(ExitCode::FAILURE);
            }
        },
        Cmd::Health => {
            let ok = client.health().await?;
            println!("{}", if ok { "ok" } else { "not ok" });
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
        Cmd::Smoke => smoke(&client).await?,
    }
    Ok(ExitCode::SUCCESS)
}

async fn smoke(client: &Client) -> anyhow::Result<()> {
    println!("1) health");
    if !client.health().await? {
        bail!("backend não está saudável");
    }

    println!("2) create");
    let content = "smoke test";
    let created = client
        .create(&CreateRequest {
            content,
            ttl_seconds: Some(300),
            max_views: Some(5),
        })
        .await?;
    println!("   {}", created.url);

    println!("3) read");
    let paste = client
        .get(&created.id)
        .await?
        .with_context(|| format!("paste {} não encontrado logo após a criação", created.id))?;
    if paste.content != content {
        bail!("conteúdo divergente: {:?}", paste.content);
    }
    if paste.remaining_views != Some(4) {
        bail!("remaining_views inesperado: {:?}", paste.remaining_views);
    }
    println!("{}", format_paste(&paste));
    println!("smoke ok");
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Formata um paste lido para exibição humana.
fn format_paste(paste: &Fetched) -> String {
    let views = match paste.remaining_views {
        Some(n) => format!("(integer) {n}"),
        None => "(nil)".to_string(),
    };
    let expires = paste.expires_at.as_deref().unwrap_or("(nil)");
    format!(
        "{}\n-- remaining_views: {views}\n-- expires_at: {expires}",
        paste.content
    )
}
