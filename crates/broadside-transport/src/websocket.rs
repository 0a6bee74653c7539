//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    closed: AtomicBool,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    ///
    /// Pass port `0` to let the OS pick a free port, then read it back
    /// with [`Transport::local_addr`].
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            closed: AtomicBool::new(false),
        })
    }
}

impl Transport for WebSocketTransport {
    type Incoming = PendingWebSocket;
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Shutdown);
        }

        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP stream");

        Ok(PendingWebSocket { id, addr, stream })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.closed.store(true, Ordering::Release);
        tracing::info!("WebSocket transport stopped accepting");
        Ok(())
    }
}

/// A TCP stream that has not yet been upgraded to WebSocket.
///
/// Returned by [`WebSocketTransport::accept`]. Nothing has been read from
/// the peer at this point.
#[derive(Debug)]
pub struct PendingWebSocket {
    id: ConnectionId,
    addr: SocketAddr,
    stream: TcpStream,
}

impl PendingWebSocket {
    /// The remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let ws = tokio_tungstenite::accept_async(self.stream)
            .await
            .map_err(|e| {
                TransportError::AcceptFailed(TransportError::io(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::debug!(id = %self.id, addr = %self.addr, "WebSocket handshake complete");
        Ok(WebSocketConnection::new(self.id, self.addr, ws))
    }
}

/// A single WebSocket connection.
///
/// The stream is split into independently locked halves so the writer
/// task can push frames while the reader is parked in [`recv`].
///
/// [`recv`]: Connection::recv
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    fn new(id: ConnectionId, peer: SocketAddr, ws: WsStream) -> Self {
        let (sink, stream) = ws.split();
        Self {
            id,
            peer,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| send_error(self.id, e))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        TransportError::io(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| send_error(self.id, e))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}

/// Maps a failed write to [`TransportError`].
///
/// Writing to a socket that is already closing is reported as
/// `ConnectionClosed`, so callers can tell a finished peer from a broken
/// pipe.
fn send_error(id: ConnectionId, err: WsError) -> TransportError {
    match err {
        WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Protocol(WsProtocolError::SendAfterClosing) => {
            TransportError::ConnectionClosed(id.to_string())
        }
        other => TransportError::SendFailed(TransportError::io(
            std::io::ErrorKind::BrokenPipe,
            other,
        )),
    }
}
