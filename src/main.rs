use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use study_mode::session::ChatController;
use study_mode::utils::{bind_listener, init_logger};
use study_mode::{config::Config, routes::create_router, AppState};

/// Study Mode: chat with an LLM about your uploaded study material
#[derive(Debug, Parser)]
#[command(name = "study-mode", version, about)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long, short)]
    port: Option<u16>,

    /// Secrets file holding GEMINI_API_KEY (overrides STUDY_MODE_SECRETS)
    #[arg(long)]
    secrets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.secrets)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _log_guard = init_logger(&config.logging);
    info!("Configuration loaded: {:?}", config.server);
    info!("LLM settings: {:?}", config.llm);

    let chat = ChatController::from_config(&config.llm)?;
    if !chat.is_configured() {
        warn!("Chat is disabled until an API key is configured");
    }

    let listener = bind_listener(&config.server).await?;
    info!("Server listening on {}", listener.local_addr()?);

    let state = AppState::new(config, chat);
    match state.config.server.session_ttl_secs {
        0 => info!("Idle session expiry disabled"),
        secs => {
            let _sweeper = state.sessions.spawn_sweeper(Duration::from_secs(secs));
        }
    }
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
