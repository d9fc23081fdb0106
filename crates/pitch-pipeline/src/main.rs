//! Player detection CLI binary.

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pitch_inference::GeminiClient;
use pitch_models::DetectionResultSet;
use pitch_pipeline::{DetectionPipeline, PipelineConfig};
use pitch_upload::FilesClient;

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("pitch=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    // Optional Prometheus endpoint
    if let Ok(addr) = std::env::var("METRICS_ADDR") {
        match addr.parse::<std::net::SocketAddr>() {
            Ok(sock) => {
                match metrics_exporter_prometheus::PrometheusBuilder::new()
                    .with_http_listener(sock)
                    .install()
                {
                    Ok(()) => info!("Serving Prometheus metrics on {}", sock),
                    Err(e) => warn!("Failed to start metrics exporter: {}", e),
                }
            }
            Err(e) => warn!("Invalid METRICS_ADDR {:?}: {}", addr, e),
        }
    }

    match run().await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize result: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<DetectionResultSet> {
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let path = args.next();
    let jersey = args.next();

    let api_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY is not set")?;

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let files = FilesClient::new(api_key.clone()).with_chunk_size(config.chunk_size);
    let model = GeminiClient::new(api_key);
    let pipeline = DetectionPipeline::new(files, model, config);

    match (command.as_str(), path) {
        ("detect", Some(path)) => {
            info!("Detecting players in {}", path);
            Ok(pipeline.detect_players_in_file(&path).await?)
        }
        ("upload", Some(path)) => {
            info!("Uploading {} for full-video detection", path);
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path))?;
            let display_name = std::path::Path::new(&path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("video.mp4")
                .to_string();
            let mime_type = guess_mime_type(&display_name);
            Ok(pipeline
                .detect_players_in_video(&data, &display_name, mime_type)
                .await?)
        }
        ("analyze", Some(path)) => {
            let jersey = jersey.context("analyze requires a jersey number argument")?;
            info!("Analyzing player #{} in {}", jersey, path);
            Ok(pipeline.analyze_player_performance(&path, &jersey).await?)
        }
        _ => anyhow::bail!(
            "Usage: pitchscan <detect|upload> <video-path>\n       pitchscan analyze <video-path> <jersey-number>"
        ),
    }
}

fn guess_mime_type(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        _ => "video/mp4",
    }
}
