use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use pastelite_server::{AppState, Args, app};
use pastelite_storage::{PasteService, open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pastelite_server=info,pastelite_storage=info,tower_http=info".into()
            }),
        )
        .init();

    let args = Args::parse();
    let config = args.server_config();

    let store = open_store(&args.backend_config())?;
    let service = PasteService::new(store);
    if let Err(e) = service.health().await {
        warn!("backend {} não respondeu na inicialização: {e}", service.store().name());
    }
    if config.test_mode {
        warn!("TEST_MODE ativo: header x-test-now-ms controla o relógio");
    }

    let listener = TcpListener::bind(&config.addr).await?;
    info!("pastelite escutando em {}", config.addr);

    axum::serve(listener, app(AppState::new(service, &config)))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("sinal de shutdown recebido");
        })
        .await?;

    info!("servidor encerrado");
    Ok(())
}
