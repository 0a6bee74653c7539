//! `BroadsideServer` builder and server loop.
//!
//! This is the entry point for running a Broadside server. It ties
//! together all the layers: transport → protocol → lobby.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use broadside_lobby::{LobbyHandle, spawn_lobby};
use broadside_protocol::JsonCodec;
use broadside_transport::{Transport, TransportError, WebSocketTransport};

use crate::handler::handle_incoming;
use crate::{BroadsideError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) lobby: LobbyHandle,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Option<Duration>,
    pub(crate) handshake_timeout: Option<Duration>,
    started: Instant,
}

impl ServerState {
    /// Milliseconds since the server started; stamped on every envelope.
    pub(crate) fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Builder for configuring and starting a Broadside server.
///
/// # Example
///
/// ```rust,ignore
/// let server = BroadsideServer::builder()
///     .config(config)
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct BroadsideServerBuilder {
    config: ServerConfig,
}

impl BroadsideServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration. Call before [`bind`](Self::bind)
    /// if both are used.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and starts the lobby actor.
    pub async fn build(self) -> Result<BroadsideServer, BroadsideError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let lobby = spawn_lobby(self.config.lobby.clone());

        let state = Arc::new(ServerState {
            lobby,
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout(),
            handshake_timeout: self.config.handshake_timeout(),
            started: Instant::now(),
        });

        Ok(BroadsideServer { transport, state })
    }
}

/// A Broadside server, bound and ready to accept.
///
/// Call [`run_until()`](Self::run_until) to start accepting connections.
pub struct BroadsideServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl BroadsideServer {
    /// Creates a new builder.
    pub fn builder() -> BroadsideServerBuilder {
        BroadsideServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, BroadsideError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the lobby, for introspection.
    pub fn lobby(&self) -> LobbyHandle {
        self.state.lobby.clone()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), BroadsideError> {
        self.run_until(std::future::pending()).await.map(|_| ())
    }

    /// Runs the accept loop until `shutdown` completes, then disconnects
    /// every connection and stops the lobby.
    ///
    /// Returns the number of connections that were open at shutdown.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<usize, BroadsideError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Broadside server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(incoming) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_incoming(incoming, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(TransportError::Shutdown) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        self.transport.shutdown().await?;
        if let Ok(snapshot) = self.state.lobby.snapshot().await {
            tracing::info!(
                players = snapshot.players.len(),
                open_hosts = snapshot.open_hosts.len(),
                watchers = snapshot.watchers.len(),
                "disconnecting everyone"
            );
        }
        let closed = self.state.lobby.shutdown("server shutting down").await?;
        tracing::info!(closed, "Broadside server stopped");
        Ok(closed)
    }
}
