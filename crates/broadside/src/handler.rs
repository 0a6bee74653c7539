//! Per-connection handler: frames in, lobby events out, pushes back.
//!
//! Each accepted peer gets its own Tokio task running this handler,
//! plus a writer task that owns the send side:
//!   0. Finish the WebSocket handshake, under a deadline
//!   1. Attach an outbox to the lobby
//!   2. Writer: outbox → envelope → frame, until the outbox closes
//!   3. Reader: frame → envelope → lobby, until close, error or idle
//!   4. Report the failure so the lobby unwinds the player

use std::sync::Arc;

use broadside_lobby::{FailureCause, LobbyHandle};
use broadside_protocol::{ClientEvent, Codec, Envelope, ServerEvent};
use broadside_transport::{
    Connection, ConnectionId, Handshake, PendingWebSocket, TransportError,
    WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::BroadsideError;
use crate::server::ServerState;

/// Drop guard that reports the connection as failed when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the send.
struct FailureGuard {
    conn_id: ConnectionId,
    lobby: LobbyHandle,
    cause: FailureCause,
}

impl Drop for FailureGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let lobby = self.lobby.clone();
        let cause = std::mem::replace(&mut self.cause, FailureCause::Disconnected);
        tokio::spawn(async move {
            let _ = lobby.fail(conn_id, cause).await;
        });
    }
}

/// What the reader got from the connection.
enum Inbound {
    Frame(Vec<u8>),
    Closed,
    Failed(TransportError),
    Idle,
}

/// Completes the handshake for a freshly accepted peer, then hands the
/// connection to [`handle_connection`].
///
/// A peer that does not finish the upgrade in time is dropped here. It was
/// never attached to the lobby, so there is nothing to clean up.
pub(crate) async fn handle_incoming(
    incoming: PendingWebSocket,
    state: Arc<ServerState>,
) -> Result<(), BroadsideError> {
    let conn_id = incoming.id();
    let peer = incoming.peer_addr();
    let conn = match state.handshake_timeout {
        Some(limit) => match tokio::time::timeout(limit, incoming.complete()).await {
            Ok(conn) => conn?,
            Err(_) => {
                tracing::info!(%conn_id, %peer, "handshake timed out, dropping");
                return Ok(());
            }
        },
        None => incoming.complete().await?,
    };
    handle_connection(conn, state).await
}

/// Handles a single connection from handshake to close.
async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), BroadsideError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = ?conn.peer_addr(), "handling new connection");

    let (outbox, inbox) = mpsc::unbounded_channel();
    state.lobby.attach(conn_id, outbox.clone()).await?;
    let mut guard = FailureGuard {
        conn_id,
        lobby: state.lobby.clone(),
        cause: FailureCause::Disconnected,
    };

    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        inbox,
    ));

    loop {
        let data = match next_inbound(&conn, &state).await {
            Inbound::Frame(data) => data,
            Inbound::Closed => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Inbound::Failed(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                guard.cause = FailureCause::TransportError(e.to_string());
                break;
            }
            Inbound::Idle => {
                tracing::info!(%conn_id, "connection idle, dropping");
                guard.cause = FailureCause::IdleTimeout;
                break;
            }
        };

        let envelope: Envelope<ClientEvent> = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                continue;
            }
        };

        match envelope.payload {
            ClientEvent::Heartbeat { client_time } => {
                let _ = outbox.send(ServerEvent::HeartbeatAck {
                    client_time,
                    server_time: state.elapsed_ms(),
                });
            }
            event => {
                state.lobby.send_event(conn_id, envelope.seq, event).await?;
            }
        }
    }

    // Once the lobby has dropped its copy of the outbox the writer drains
    // what is left and stops.
    drop(outbox);
    drop(guard);
    let _ = writer.await;
    let _ = conn.close().await;
    Ok(())
}

async fn next_inbound(conn: &WebSocketConnection, state: &ServerState) -> Inbound {
    let received = match state.idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
            Ok(received) => received,
            Err(_) => return Inbound::Idle,
        },
        None => conn.recv().await,
    };
    match received {
        Ok(Some(data)) => Inbound::Frame(data),
        Ok(None) => Inbound::Closed,
        Err(e) => Inbound::Failed(e),
    }
}

/// Sends every event pushed to this connection, in order.
///
/// Stops when the outbox closes, when a send fails, or right after a
/// [`ServerEvent::Disconnect`] has been delivered.
async fn write_loop(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState>,
    mut inbox: mpsc::UnboundedReceiver<ServerEvent>,
) {
    let conn_id = conn.id();
    let mut seq: u64 = 1;

    while let Some(event) = inbox.recv().await {
        let closing = matches!(event, ServerEvent::Disconnect { .. });
        let envelope = Envelope {
            seq: next_seq(&mut seq),
            timestamp: state.elapsed_ms(),
            payload: event,
        };

        let bytes = match state.codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
        if closing {
            let _ = conn.close().await;
            break;
        }
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
