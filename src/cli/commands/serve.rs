//! Implementation of the `hackeval serve` command.

use anyhow::{anyhow, Result};
use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::adapters::http::{EvaluationHttpConfig, EvaluationHttpServer};
use crate::cli::commands::{build_pipeline, resolve_rubric};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: Config) -> Result<()> {
    let mut http_config = EvaluationHttpConfig::from(&config.server);
    if let Some(host) = args.host {
        http_config.host = host;
    }
    if let Some(port) = args.port {
        http_config.port = port;
    }

    let params = Arc::new(resolve_rubric(&config).into_params());
    let pipeline = build_pipeline(&config)?;
    let gate = pipeline.gate().clone();

    info!(
        engine = pipeline.engine().name(),
        host = %http_config.host,
        port = http_config.port,
        "starting evaluation service"
    );

    let server = EvaluationHttpServer::new(pipeline, params, http_config);
    server
        .serve_with_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown requested, rejecting queued evaluations");
            gate.close();
        })
        .await
        .map_err(|e| anyhow!("Evaluation HTTP server failed: {e}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
