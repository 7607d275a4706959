use anyhow::Context;
use clap::Parser;
use distributed_cache::config::{
    CacheConfig, DEFAULT_BASE_PATH, DEFAULT_CACHE_BYTES, DEFAULT_REPLICAS,
};
use distributed_cache::group::handlers::api_router;
use distributed_cache::group::{Group, LoaderFn, new_group};
use distributed_cache::peers::HttpPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "cache-node", about = "Runs one node of the distributed cache")]
struct Args {
    /// Port of this node's peer server.
    #[arg(long, env = "CACHE_PORT", default_value_t = 8001)]
    port: u16,

    /// Every node of the cluster, this one included.
    #[arg(
        long,
        env = "CACHE_PEERS",
        value_delimiter = ',',
        default_value = "http://localhost:8001,http://localhost:8002,http://localhost:8003"
    )]
    peers: Vec<String>,

    /// Also start the client-facing API server.
    #[arg(long)]
    api: bool,

    #[arg(long, env = "CACHE_API_ADDR", default_value = "127.0.0.1:9999")]
    api_addr: SocketAddr,

    #[arg(long, env = "CACHE_BYTES", default_value_t = DEFAULT_CACHE_BYTES)]
    cache_bytes: usize,

    #[arg(long, default_value_t = DEFAULT_REPLICAS)]
    replicas: usize,

    #[arg(long, default_value = DEFAULT_BASE_PATH)]
    base_path: String,

    #[arg(long, default_value_t = 500)]
    peer_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let self_addr = format!("http://localhost:{}", args.port);

    tracing::info!("Starting cache node {}", self_addr);
    tracing::info!("Peers: {:?}", args.peers);

    let config = CacheConfig::new(self_addr)
        .with_cache_bytes(args.cache_bytes)
        .with_replicas(args.replicas)
        .with_base_path(&args.base_path)
        .with_peer_timeout(Duration::from_millis(args.peer_timeout_ms))
        .with_peers(args.peers);

    // 1. Group backed by the slow database:
    let group = create_scores_group(config.cache_bytes)?;

    // 2. Peer pool:
    let pool = HttpPool::new(&config);
    group.register_peers(pool.clone());

    // 3. Optional API server:
    if args.api {
        let app = api_router(group.clone());
        let listener = tokio::net::TcpListener::bind(args.api_addr)
            .await
            .with_context(|| format!("binding API server to {}", args.api_addr))?;
        tracing::info!("API server listening on {}", args.api_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("API server stopped: {}", e);
            }
        });
    }

    // 4. Peer server:
    let peer_addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(peer_addr)
        .await
        .with_context(|| format!("binding cache server to {}", peer_addr))?;

    tracing::info!("Cache server listening on {}", peer_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, pool.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Cache node stopped");
    Ok(())
}

fn create_scores_group(cache_bytes: usize) -> anyhow::Result<Arc<Group>> {
    let db: Arc<HashMap<&'static str, &'static str>> =
        Arc::new(HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]));

    let loader = LoaderFn(move |key: String| {
        let db = db.clone();
        async move {
            tracing::info!("[SlowDB] search key {}", key);
            match db.get(key.as_str()) {
                Some(score) => anyhow::Ok(score.as_bytes().to_vec()),
                None => Err(anyhow::anyhow!("{} not exist", key)),
            }
        }
    });

    Ok(new_group("scores", cache_bytes, loader)?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
