//! semcache gateway entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;

use semcache::{AnyContentStore, AnyEmbedder, AnyVectorIndex, HashEmbedder, HttpEmbedder};
use semcache::{InMemoryContentStore, InMemoryVectorIndex, QdrantVectorIndex};

use semcache_gateway::config::Config;
use semcache_gateway::gateway::{create_router, HandlerState};
use semcache_gateway::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        mock_upstream = config.mock_upstream,
        "semcache starting"
    );

    let http_client = reqwest::Client::new();

    let embedder = std::sync::Arc::new(build_embedder(&config, http_client.clone()));
    let index = std::sync::Arc::new(build_vector_index(&config).await?);
    let store = std::sync::Arc::new(AnyContentStore::Memory(InMemoryContentStore::new()));

    let upstream = UpstreamClient::new(
        http_client,
        config.upstream_base_url.clone(),
        config.upstream_api_key.clone(),
    )
    .with_mock(config.mock_upstream);

    let state = HandlerState::new(embedder, index, store, upstream, config);
    let tracker = state.tracker.clone();
    let background_deadline = state.config.background_deadline;

    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("closing background write tracker");
    tracker.close();
    if tokio::time::timeout(background_deadline, tracker.wait())
        .await
        .is_err()
    {
        tracing::warn!("background writes still in flight past deadline; exiting anyway");
    }

    tracing::info!("semcache shutdown complete");
    Ok(())
}

/// `SEMCACHE_MOCK_UPSTREAM` selects a network-free embedder so the whole
/// gateway can run with no external dependencies (SPEC_FULL.md §D). A real
/// deployment calls the same OpenAI-compatible host as `UpstreamClient`
/// for embeddings, since the teacher's embedder and chat client share no
/// separate endpoint either.
fn build_embedder(config: &Config, client: reqwest::Client) -> AnyEmbedder {
    if config.mock_upstream {
        AnyEmbedder::Hash(HashEmbedder::new(config.embedding_dim))
    } else {
        AnyEmbedder::Http(HttpEmbedder::new(
            client,
            config.upstream_base_url.clone(),
            config.upstream_api_key.clone(),
            config.default_model.clone(),
            config.embedding_dim,
        ))
    }
}

async fn build_vector_index(config: &Config) -> anyhow::Result<AnyVectorIndex> {
    if config.mock_upstream {
        Ok(AnyVectorIndex::Memory(InMemoryVectorIndex::new()))
    } else {
        let index = QdrantVectorIndex::connect(&config.qdrant_url, config.embedding_dim as u64).await?;
        Ok(AnyVectorIndex::Qdrant(index))
    }
}

fn run_health_check() -> i32 {
    let port = std::env::var("SEMCACHE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{port}/healthz");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating graceful shutdown");
        }
    }
}
