use std::sync::Arc;
use std::time::Duration;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use warden_app::app::api::routes;
use warden_app::security_handler::SecurityServiceHandler;
use warden_core::config::load_config;
use warden_db::store::StoreRegistry;
use warden_service::auth::{IdentityResolver, SecurityService, StaticDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Warden identity service");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store = StoreRegistry::new().create(&config.security.store)?;
    let directory = StaticDirectory::from_config(&config.security.directory);
    tracing::info!(
        directory_enabled = directory.is_some(),
        "Directory integration configured"
    );

    let resolver = Arc::new(IdentityResolver::from_config(
        &config.security,
        store,
        directory,
    ));
    let service = Arc::new(SecurityService::from_config(&config.security, resolver)?);

    // Entries nobody looks up again are only dropped by a sweep.
    let sweeper = Arc::clone(service.resolver());
    let sweep_every = config
        .security
        .cache
        .authorization_ttl()
        .max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweeper.caches().purge_expired();
        }
    });

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(SecurityServiceHandler { service })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
