use audio_transcribe_api::config::AppConfig;
use audio_transcribe_api::services::transcriber::GroqTranscriber;
use audio_transcribe_api::services::transcription::TranscriptionService;
use audio_transcribe_api::{AppState, create_app};
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audio_transcribe_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting audio transcription API...");

    let config = AppConfig::from_env()?;
    info!(
        "🎙️  Transcription: model={}, language={}, provider={}",
        config.model, config.language, config.api_base_url
    );
    info!(
        "📁 Staging: dir={}, max upload={}MB, filenames={:?}, content type match={:?}, content sniffing={}",
        config.upload_dir.display(),
        config.max_upload_size / 1024 / 1024,
        config.filename_policy,
        config.content_type_match,
        config.verify_audio_content
    );

    if !config.upload_dir.is_dir() {
        warn!(
            "⚠️  Staging directory {} does not exist; uploads will fail until it is created",
            config.upload_dir.display()
        );
    }

    let transcriber = Arc::new(GroqTranscriber::from_config(&config)?);
    let transcription = Arc::new(TranscriptionService::new(transcriber, &config));

    let state = AppState {
        transcription,
        config: config.clone(),
    };

    let app = create_app(state);

    let addr = config.bind_addr()?;
    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
