use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::Parser;
use sparrowdns::{
    AppState, SharedState, api,
    config::{AppConfig, DEFAULT_TTL, RenameStrategy},
    db,
    powerdns::client::PowerDnsClient,
    validation::MIN_TTL,
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Listen address for the HTTP server
    #[arg(long, env = "LISTEN", value_name = "ADDR", default_value = "0.0.0.0:5000")]
    listen: SocketAddr,
    /// Path to the SQLite database file (":memory:" for an ephemeral store)
    #[arg(long, env = "DB_PATH", value_name = "PATH", default_value = "sparrowdns.sqlite")]
    db_path: PathBuf,
    /// PowerDNS API URL (e.g. http://127.0.0.1:8081/api/v1)
    #[arg(long, env = "PDNS_URL", value_name = "URL")]
    pdns_url: String,
    /// PowerDNS API key
    #[arg(long, env = "PDNS_API_KEY", value_name = "KEY", hide_env_values = true)]
    pdns_key: String,
    /// PowerDNS server ID
    #[arg(long, env = "PDNS_SERVER_ID", value_name = "ID", default_value = "localhost")]
    pdns_server_id: String,
    /// TTL used when a request does not carry one
    #[arg(long, env = "DEFAULT_TTL", value_name = "SECONDS", default_value_t = DEFAULT_TTL)]
    default_ttl: u32,
    /// Nameserver for zones created by import (repeat for multiple values)
    #[arg(long = "default-ns", env = "DEFAULT_NS", value_name = "FQDN", value_delimiter = ',')]
    default_ns: Vec<String>,
    /// How record renames are sent to PowerDNS
    #[arg(long, env = "RENAME_STRATEGY", value_enum, default_value_t = RenameStrategy::Batched)]
    rename_strategy: RenameStrategy,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = build_app_config(&cli)?;
    let state = init_shared_state(&cli, config).await?;

    let app = api::create_router(state);

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind to {}", cli.listen))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server exited with error")?;

    Ok(())
}

async fn init_shared_state(cli: &Cli, config: AppConfig) -> Result<SharedState> {
    if let Some(parent) = cli.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create db directory {}", parent.display()))?;
    }

    let db = db::init_db(&cli.db_path).await?;
    let pdns = PowerDnsClient::new(&cli.pdns_url, &cli.pdns_key, &cli.pdns_server_id);

    Ok(Arc::new(AppState::new(config, db, pdns)))
}

fn build_app_config(cli: &Cli) -> Result<AppConfig> {
    if cli.default_ttl < MIN_TTL {
        bail!("--default-ttl must be at least {MIN_TTL} seconds");
    }

    let default_nameservers = cli
        .default_ns
        .iter()
        .map(|ns| normalize_fqdn(ns).with_context(|| format!("invalid default-ns value '{ns}'")))
        .collect::<Result<Vec<_>>>()?;

    Ok(AppConfig {
        default_ttl: cli.default_ttl,
        default_nameservers,
        rename_strategy: cli.rename_strategy,
    })
}

fn normalize_fqdn(input: &str) -> Result<String> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        bail!("FQDN cannot be empty");
    }
    Ok(format!("{}.", trimmed))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install CTRL+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
