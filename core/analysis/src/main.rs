use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use textlens_analysis::{router, AnalysisConfig, AnalysisService};
use textlens_indexing::AnalysisStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "textlens")]
#[command(about = "Summarize, classify and index free text with heuristics or an LLM")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "TEXTLENS_ADDR", default_value = "127.0.0.1:8000")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("TextLens Analysis Service v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = AnalysisConfig::from_env().context("Invalid configuration")?;
    info!(
        "OpenAI model: {}, Ollama model: {} at {}",
        config.openai.model, config.ollama.model, config.ollama.base_url
    );
    if config.fault_trigger.is_some() {
        info!("Heuristic fault trigger enabled");
    }

    let service = Arc::new(AnalysisService::new(AnalysisStore::new(), config));
    let app = router(Arc::clone(&service));

    info!("Starting HTTP server on http://{}", args.addr);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router is gone once serve returns, so the service is ours again
    if let Ok(service) = Arc::try_unwrap(service) {
        let records = service.into_store().close();
        info!("Discarded {} in-memory analyses", records.len());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
