// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Accepts connections on the Unix socket and, when configured, a TCP
//! port. Each connection is served in its own task until the client
//! closes it.

use std::sync::Arc;
use std::time::Duration;

use hf_wire::{ProtocolError, Request, Response, PROTOCOL_VERSION};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::handler::RequestHandler;

/// Shared daemon context for every connection.
pub struct ListenCtx {
    pub handler: Arc<dyn RequestHandler>,
    pub shutdown: Arc<Notify>,
    /// When set, TCP clients must provide this token in the Hello handshake.
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl ListenCtx {
    pub fn new(handler: Arc<dyn RequestHandler>, shutdown: Arc<Notify>) -> Self {
        Self { handler, shutdown, auth_token: None, timeout: crate::env::ipc_timeout() }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Listener task for accepting socket connections.
pub struct Listener {
    unix: UnixListener,
    tcp: Option<TcpListener>,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    /// Create a new listener with Unix socket only.
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp: None, ctx }
    }

    /// Create a new listener with both Unix socket and TCP.
    pub fn with_tcp(unix: UnixListener, tcp: TcpListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp: Some(tcp), ctx }
    }

    /// Run the listener loop, spawning a task for each connection.
    pub async fn run(mut self) {
        match self.tcp.take() {
            Some(tcp) => self.run_dual(tcp).await,
            None => self.run_unix_only().await,
        }
    }

    async fn run_unix_only(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let (reader, writer) = stream.into_split();
                    spawn_connection(reader, writer, ConnectionSource::Unix, &self.ctx);
                }
                Err(e) => error!(error = %e, "unix accept error"),
            }
        }
    }

    async fn run_dual(self, tcp: TcpListener) {
        loop {
            tokio::select! {
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let (reader, writer) = stream.into_split();
                        spawn_connection(reader, writer, ConnectionSource::Unix, &self.ctx);
                    }
                    Err(e) => error!(error = %e, "unix accept error"),
                },
                result = tcp.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "tcp connection");
                        let (reader, writer) = stream.into_split();
                        spawn_connection(reader, writer, ConnectionSource::Tcp, &self.ctx);
                    }
                    Err(e) => error!(error = %e, "tcp accept error"),
                },
            }
        }
    }
}

/// Source of a connection (for auth decisions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionSource {
    /// Local Unix socket: trusted, no auth required.
    Unix,
    /// Remote TCP: must open with a Hello carrying the auth token.
    Tcp,
}

fn spawn_connection<R, W>(reader: R, writer: W, source: ConnectionSource, ctx: &Arc<ListenCtx>)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        if let Err(e) = handle_connection(reader, writer, source, &ctx).await {
            log_connection_error(e);
        }
    });
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::ConnectionClosed => debug!("client disconnected"),
        ProtocolError::Timeout => warn!("connection timeout"),
        _ => error!(error = %e, "connection error"),
    }
}

/// Serve requests on one connection until the client closes it.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    source: ConnectionSource,
    ctx: &ListenCtx,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut authenticated = source == ConnectionSource::Unix;
    let mut served = 0usize;

    loop {
        let request = match hf_wire::read_request(&mut reader, ctx.timeout).await {
            Ok(request) => request,
            Err(ProtocolError::ConnectionClosed) if served > 0 => return Ok(()),
            Err(e) => return Err(e),
        };
        served += 1;

        if !authenticated {
            if let Err(response) = authenticate(&request, ctx) {
                warn!(request = request.name(), "rejected unauthenticated tcp request");
                hf_wire::write_response(&mut writer, &response, ctx.timeout).await?;
                return Ok(());
            }
            authenticated = true;
        }

        if request.is_query() {
            debug!(request = request.name(), "received query");
        } else {
            info!(request = request.name(), "received request");
        }

        let response = dispatch(request, ctx).await;
        debug!(?response, "sending response");
        hf_wire::write_response(&mut writer, &response, ctx.timeout).await?;
    }
}

/// TCP connections must open with a Hello carrying the configured token.
/// Without a configured token every Hello is accepted.
fn authenticate(request: &Request, ctx: &ListenCtx) -> Result<(), Response> {
    let Request::Hello { token, .. } = request else {
        return Err(Response::rejected("TCP connections must start with Hello"));
    };
    match (&ctx.auth_token, token) {
        (None, _) => Ok(()),
        (Some(expected), Some(provided)) if provided == expected => Ok(()),
        _ => Err(Response::rejected("unauthorized")),
    }
}

async fn dispatch(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version, .. } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }
        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
        other => ctx.handler.handle(other).await,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
