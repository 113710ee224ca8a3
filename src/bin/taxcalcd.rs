//! HTTP server reporting net income after tax.
//!
//! ```bash
//! taxcalcd --port 8080 --cache-size 1000
//! curl 'localhost:8080/api/v1/?salary=60000&state=ca&pay-frequency=weekly'
//! ```

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, Level};

use taxcalc::api::{create_router, AppState};
use taxcalc::config::{ConfigLoader, ServiceConfig};
use taxcalc::coordinator::RequestCoordinator;
use taxcalc::error::{TaxError, TaxResult};
use taxcalc::observability::{init_default_logging, init_logging, verbosity_level, LogFormat};

/// Serves net income after tax over HTTP.
#[derive(Debug, Parser)]
#[command(name = "taxcalcd", version)]
struct Cli {
    /// YAML configuration file; flags override its values.
    #[arg(long, env = "TAXCALCD_CONFIG")]
    config: Option<PathBuf>,

    /// Number of entries to keep in the response cache.
    #[arg(short, long, env = "TAXCALCD_CACHE_SIZE")]
    cache_size: Option<usize>,

    /// Port to listen on.
    #[arg(short, long, env = "TAXCALCD_PORT")]
    port: Option<u16>,

    /// Minimum milliseconds between upstream calls.
    #[arg(short, long, env = "TAXCALCD_RATE_LIMIT_MS")]
    rate_limit_ms: Option<u64>,

    /// Increase log verbosity (repeatable); otherwise LOG_LEVEL applies.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn service_config(&self) -> TaxResult<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load(path)?.into_config(),
            None => ServiceConfig::default(),
        };

        if let Some(cache_size) = self.cache_size {
            config.cache_size = cache_size;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(rate_limit_ms) = self.rate_limit_ms {
            config.rate_limit_ms = rate_limit_ms;
        }

        Ok(ConfigLoader::from_config(config)?.into_config())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = if cli.verbose == 0 {
        init_default_logging()
    } else {
        let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default());
        init_logging(verbosity_level(Level::INFO, cli.verbose), format)
    };
    if let Err(err) = logging {
        eprintln!("taxcalcd: failed to initialize logging: {err}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server exited with error");
            eprintln!("taxcalcd: {err}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> TaxResult<()> {
    let config = cli.service_config()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let coordinator = RequestCoordinator::from_config(&config)?.with_shutdown(shutdown_rx);
    let router = create_router(AppState::new(coordinator), &config.base_path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(|e| TaxError::Server {
        message: format!("failed to listen on {addr}: {e}"),
    })?;
    info!(addr = %addr, base_path = %config.base_path, "listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_tx))
    .await
    .map_err(|e| TaxError::Server {
        message: e.to_string(),
    })?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, after telling in-flight rate-limit waits to give up.
async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    info!("shutdown requested");
    shutdown.send_replace(true);
}
