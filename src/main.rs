use std::net::SocketAddr;

use anyhow::Context;
use nexa_chat::{AppState, config::Config, session, store::Store};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging()?;

    let config = Config::from_env()?;
    if config.uses_default_secret() {
        warn!("SESSION_SECRET is not set, signing cookies with the built-in demo secret");
    }

    let store = Store::from_config(&config).context("failed to set up message store")?;
    // a dead database must not keep the server down; each request fails on its own
    match store.initialize().await {
        Ok(()) => info!(mode = %store.mode(), "message store ready"),
        Err(err) => error!(mode = %store.mode(), error = %err, "failed to initialize message store"),
    }

    let app_state = AppState {
        store,
        users: config.users.clone(),
    };
    let app = nexa_chat::app(app_state, session::layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,nexa_chat=debug,sqlx=warn,tower_http=info"))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
