use anyhow::Context as _;
use chat_archive::{
    api::build_router,
    config::Config,
    context::AppContext,
    indexer::reindex_all,
};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chat-archive")]
#[command(about = "Chat workspace archive and search server", version)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API and the bot WebSocket endpoint (default)
    Serve,

    /// Rebuild the search index from every stored message
    Reindex {
        /// Documents per bulk request; defaults to indexer.reindex_batch_size
        #[arg(short, long)]
        batch_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Reindex { batch_size } => reindex(config, batch_size).await,
    }
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "chat_archive={},tower_http={}",
            config.observability.log_level, config.observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting chat archive");
    tracing::info!(backend = ?config.state.backend, index = ?config.search.index_path, "Opening storage");

    if config.bot.token.is_empty() {
        tracing::warn!("bot.token is empty; WebSocket connections will be rejected");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let ctx = Arc::new(AppContext::build(config).context("Failed to build application context")?);

    let app = build_router(ctx.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(address = %addr, "HTTP API server listening");
    tracing::info!("   Search: http://{}/v1/messages", addr);
    tracing::info!("   Bot WebSocket: ws://{}/ws", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    tracing::info!("Shutting down gracefully...");
    ctx.pipeline.shutdown().await;

    Ok(())
}

async fn reindex(config: Config, batch_size: Option<usize>) -> anyhow::Result<()> {
    let batch_size = batch_size.unwrap_or(config.indexer.reindex_batch_size);
    let ctx = AppContext::build(config).context("Failed to build application context")?;

    let summary = reindex_all(ctx.store.as_ref(), ctx.engine.as_ref(), batch_size).await?;
    ctx.pipeline.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
