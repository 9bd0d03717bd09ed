// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hfd: hashfleet daemon
//!
//! Configured from `HF_*` environment variables; `HF_DAEMON_MODE` selects
//! between serving a cluster backend and running the control plane.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use hf_daemon::{
    env, reconcile, startup, ClusterHandler, Config, ControlHandler, DaemonClient, DaemonState,
    FileRecordStore, LifecycleError, ListenCtx, Listener, Mode, RequestHandler, StartupResult,
};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = init_logging(env::log_dir().as_deref());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "daemon failed");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, or to a daily-rolling file when a log directory is set.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hfd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
            None
        }
    }
}

async fn run() -> Result<(), LifecycleError> {
    let mode = env::mode()?;
    let config = Config::load(mode)?;
    match mode {
        Mode::Cluster => run_cluster(config).await,
        Mode::Control => run_control(config).await,
    }
}

async fn run_cluster(config: Config) -> Result<(), LifecycleError> {
    let settings = env::cluster_settings(&config)?;
    let StartupResult { daemon, listener } = startup(&config).await?;

    info!(
        backend = %settings.backend,
        storage_root = %settings.storage_root.display(),
        "loading cluster"
    );
    let backend = match hf_cluster::build(settings).await {
        Ok(backend) => backend,
        Err(e) => {
            daemon.shutdown();
            return Err(e.into());
        }
    };
    if let Err(e) = backend.load().await {
        daemon.shutdown();
        return Err(e.into());
    }

    serve(daemon, listener, Arc::new(ClusterHandler::new(backend))).await
}

async fn run_control(config: Config) -> Result<(), LifecycleError> {
    let records = Arc::new(FileRecordStore::new(env::records_path(&config)));
    let client = DaemonClient::new(env::cluster_addr(&config)?).with_token(env::auth_token());
    let StartupResult { daemon, listener } = startup(&config).await?;

    info!(
        cluster = %client.addr(),
        records = %records.path().display(),
        "control plane starting"
    );
    let cancel = CancellationToken::new();
    let reconciler = tokio::spawn(reconcile::run(
        Arc::clone(&records),
        Arc::new(client.clone()),
        env::reconcile_interval(),
        cancel.clone(),
    ));

    let result = serve(daemon, listener, Arc::new(ControlHandler::new(client, records))).await;
    cancel.cancel();
    if let Err(e) = reconciler.await {
        warn!(error = %e, "reconciliation task failed");
    }
    result
}

/// Serve the control API until a `Shutdown` request or a signal.
async fn serve(
    daemon: DaemonState,
    unix: UnixListener,
    handler: Arc<dyn RequestHandler>,
) -> Result<(), LifecycleError> {
    let shutdown = Arc::new(Notify::new());
    let ctx = ListenCtx::new(Arc::clone(&handler), Arc::clone(&shutdown))
        .with_auth_token(env::auth_token());

    let listener = match env::tcp_port() {
        Some(port) => {
            let tcp = match TcpListener::bind(("0.0.0.0", port)).await {
                Ok(tcp) => tcp,
                Err(e) => {
                    error!(port, error = %e, "failed to bind tcp port");
                    daemon.shutdown();
                    return Err(e.into());
                }
            };
            if ctx.auth_token.is_none() {
                warn!(port, "tcp listener has no auth token, every client is accepted");
            }
            info!(port, "listening on tcp");
            Listener::with_tcp(unix, tcp, Arc::new(ctx))
        }
        None => Listener::new(unix, Arc::new(ctx)),
    };
    let task = tokio::spawn(listener.run());
    info!(socket = %daemon.config.socket_path.display(), "ready");

    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested"),
        _ = wait_for_signal() => info!("signal received, shutting down"),
    }

    task.abort();
    handler.shutdown().await;
    daemon.shutdown();
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn wait_for_signal() {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }
}
