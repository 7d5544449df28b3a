use std::sync::Arc;

use tinyhttp::config::Config;
use tinyhttp::handlers::default_router;
use tinyhttp::routing::HandlerContext;
use tinyhttp::server::Server;
use tinyhttp::storage::DirectoryStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let ctx = match &cfg.directory {
        Some(dir) => {
            let storage = DirectoryStorage::new(dir);
            if !storage.root().is_dir() {
                tracing::warn!(directory = %storage.root().display(), "File directory does not exist");
            }
            HandlerContext::with_storage(Arc::new(storage))
        }
        None => HandlerContext::new(),
    };

    let server = Server::bind(&cfg, Arc::new(default_router()), Arc::new(ctx))?;

    tokio::select! {
        res = server.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
