use consumption_tracker::{
    AppState, Config, load_data,
    remote::RestRemoteStore,
    router,
    sync::{MemoryRemoteStore, RemoteStore},
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let remote: Arc<dyn RemoteStore> = match &config.remote_url {
        Some(url) => {
            info!(url = %url, collection = %config.remote_collection, "syncing with remote store");
            Arc::new(RestRemoteStore::new(url.clone(), config.remote_collection.clone()))
        }
        None => {
            info!("no REMOTE_URL set, remote sync stays in-process");
            Arc::new(MemoryRemoteStore::new())
        }
    };

    let data = load_data(&config.data_path).await;
    info!(
        path = %config.data_path.display(),
        entries = data.entries.len(),
        "loaded local state"
    );
    let state = AppState::new(config.data_path.clone(), data, remote);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
