use anyhow::{Context, Result};
use clap::Parser;
use health_hub_transcription::{
    create_router, AppState, Config, NatsEngineFactory, TranscriptionService,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "health-hub-transcription", about = "Bounded audio transcription service")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/health-hub")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("Loaded config: {}", cfg.service.name);
    info!("STT engine: {}", cfg.speech.nats_url);
    info!(
        "Session deadline {}ms, liveness poll every {}ms",
        cfg.transcription.session_deadline_ms, cfg.transcription.liveness_poll_interval_ms
    );

    let engines = Arc::new(NatsEngineFactory::new(cfg.speech.nats_url.clone()));
    let service = TranscriptionService::new(engines, cfg.transcription.clone());
    let app = create_router(AppState::new(service));

    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
