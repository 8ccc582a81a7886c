mod cli;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mayfly_core::{PasteStore, ShortUrlStore};
use mayfly_gateway::sweeper::Sweeper;
use mayfly_gateway::{telemetry, App, AppState};
use mayfly_generator::{Base62Generator, UrlSafeIdGenerator};
use mayfly_pastebin::{PasteManager, Pastebin, PastebinSettings};
use mayfly_shortener::{ShortUrlManager, ShortenerSettings, UrlShortener};
use mayfly_storage::{InMemoryPasteStore, InMemoryShortUrlStore, MySqlStores};
use tracing::info;

use crate::cli::{StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    telemetry::init(config.log_format).context("failed to install tracing subscriber")?;

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        "starting mayfly http server"
    );

    let (shortener, pastebin) = match config.storage {
        StorageBackendArg::InMemory => services(
            &config,
            InMemoryShortUrlStore::new(),
            InMemoryPasteStore::new(),
        ),
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let stores = MySqlStores::connect(dsn)
                .await
                .context("failed to connect to mysql")?;
            stores.migrate().await.context("failed to create schema")?;
            services(&config, stores.short_urls, stores.pastes)
        }
    };

    let sweeper = (config.sweep_interval_secs > 0).then(|| {
        Sweeper::new(
            shortener.clone(),
            pastebin.clone(),
            Duration::from_secs(config.sweep_interval_secs),
        )
        .spawn()
    });

    let state = AppState::new(shortener, pastebin, config.public_base_url.clone());
    let app = App::router_with_timeout(state, config.request_timeout());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("http server failed")?;

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }
    info!("shut down");

    Ok(())
}

fn services<U: ShortUrlStore, P: PasteStore>(
    config: &CLI,
    short_urls: U,
    pastes: P,
) -> (Arc<dyn UrlShortener>, Arc<dyn Pastebin>) {
    let shortener = ShortUrlManager::new(short_urls, Base62Generator::default()).with_settings(
        ShortenerSettings::builder()
            .code_attempts(config.code_attempts)
            .click_timeout(config.click_timeout())
            .build(),
    );
    let pastebin = PasteManager::new(pastes, UrlSafeIdGenerator::default()).with_settings(
        PastebinSettings::builder()
            .default_expiry_hours(Some(config.paste_expiry_hours))
            .build(),
    );

    (Arc::new(shortener), Arc::new(pastebin))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
