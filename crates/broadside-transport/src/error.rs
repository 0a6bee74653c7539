/// Errors that can occur in the transport layer.
///
/// The lobby treats every variant raised on a live connection the same
/// way as a clean close: the connection's player record is torn down.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the connection.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or upgrading an incoming stream failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The transport stopped accepting connections.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    /// Wraps a tungstenite error as an I/O error of the given kind.
    #[cfg(feature = "websocket")]
    pub(crate) fn io(
        kind: std::io::ErrorKind,
        err: tokio_tungstenite::tungstenite::Error,
    ) -> std::io::Error {
        std::io::Error::new(kind, err)
    }
}
