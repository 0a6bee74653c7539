//! Lobby actor: a single Tokio task that owns the [`Lobby`].
//!
//! Connection tasks never touch lobby state directly. They send commands
//! through a [`LobbyHandle`], and the actor applies them one at a time, so
//! every handler runs to completion before the next event is looked at.

use broadside_protocol::ClientEvent;
use broadside_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{FailureCause, Lobby, LobbyConfig, LobbyError, LobbySnapshot, Outbox};

/// Commands sent to the lobby actor through its channel.
enum LobbyCommand {
    /// Start delivering pushes for a connection.
    Attach {
        conn: ConnectionId,
        outbox: Outbox,
        reply: oneshot::Sender<Result<(), LobbyError>>,
    },

    /// A decoded client event (fire-and-forget).
    Event {
        conn: ConnectionId,
        seq: u64,
        event: ClientEvent,
    },

    /// The connection is gone.
    Failure {
        conn: ConnectionId,
        cause: FailureCause,
    },

    Snapshot {
        reply: oneshot::Sender<LobbySnapshot>,
    },

    /// Disconnect everyone and stop.
    Shutdown {
        reason: String,
        reply: oneshot::Sender<usize>,
    },
}

/// Handle to the running lobby actor.
///
/// Cheap to clone; every connection task holds one.
#[derive(Debug, Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// Attaches a connection's outbox. Must happen before its first event.
    pub async fn attach(
        &self,
        conn: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Attach {
                conn,
                outbox,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable)?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Forwards a client event. Any reply arrives through the outbox.
    pub async fn send_event(
        &self,
        conn: ConnectionId,
        seq: u64,
        event: ClientEvent,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Event { conn, seq, event })
            .await
            .map_err(|_| LobbyError::Unavailable)
    }

    /// Reports that a connection is gone.
    pub async fn fail(
        &self,
        conn: ConnectionId,
        cause: FailureCause,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Failure { conn, cause })
            .await
            .map_err(|_| LobbyError::Unavailable)
    }

    pub async fn snapshot(&self) -> Result<LobbySnapshot, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| LobbyError::Unavailable)?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Disconnects every connection and stops the actor. Returns how many
    /// connections were closed.
    pub async fn shutdown(&self, reason: &str) -> Result<usize, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Shutdown {
                reason: reason.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable)?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

struct LobbyActor {
    lobby: Lobby,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl LobbyActor {
    async fn run(mut self) {
        tracing::info!("lobby actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Attach {
                    conn,
                    outbox,
                    reply,
                } => {
                    let _ = reply.send(self.lobby.attach(conn, outbox));
                }
                LobbyCommand::Event { conn, seq, event } => {
                    self.lobby.handle_event(conn, seq, event);
                }
                LobbyCommand::Failure { conn, cause } => {
                    self.lobby.fail(conn, cause);
                }
                LobbyCommand::Snapshot { reply } => {
                    let _ = reply.send(self.lobby.snapshot());
                }
                LobbyCommand::Shutdown { reason, reply } => {
                    let closed = self.lobby.shutdown(&reason);
                    let _ = reply.send(closed);
                    break;
                }
            }
        }

        tracing::info!("lobby actor stopped");
    }
}

/// Spawns the lobby actor and returns a handle to it.
///
/// The command channel holds `config.command_buffer` commands; when it is
/// full, senders wait.
pub fn spawn_lobby(config: LobbyConfig) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    let actor = LobbyActor {
        lobby: Lobby::new(config),
        receiver: rx,
    };
    tokio::spawn(actor.run());
    LobbyHandle { sender: tx }
}
