//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use broadside_transport::{
        Connection, Handshake, Transport, TransportError, WebSocketConnection,
        WebSocketTransport,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    /// Accepts the next peer and runs its handshake.
    async fn accept_ws(transport: &mut WebSocketTransport) -> WebSocketConnection {
        let incoming = transport.accept().await.expect("should accept");
        incoming.complete().await.expect("handshake should succeed")
    }

    /// Binds on port 0 and returns the transport plus its real address.
    async fn bind_random() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_random().await;

        let server_handle = tokio::spawn(async move {
            accept_ws(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);
        assert!(server_conn.peer_addr().is_some());

        server_conn
            .send(b"hello from server")
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"hello from server");

        client_ws
            .send(Message::Binary(b"hello from client".to_vec().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_text_frames_are_delivered_as_bytes() {
        let (mut transport, addr) = bind_random().await;
        let server_handle =
            tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::text("{\"a\":1}")).await.unwrap();

        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, b"{\"a\":1}");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        // The reader parks in recv(); a concurrent send on the same
        // connection must still go out.
        let (mut transport, addr) = bind_random().await;
        let server_handle =
            tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = Arc::new(server_handle.await.unwrap());

        let reader = Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(
            Duration::from_secs(2),
            server_conn.send(b"push"),
        )
        .await
        .expect("send must not wait for the reader")
        .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"push");

        client_ws.send(Message::Close(None)).await.unwrap();
        let result = pending.await.unwrap().expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_random().await;
        let server_handle =
            tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_accept_does_not_wait_for_handshake() {
        let (mut transport, addr) = bind_random().await;

        // A peer that opens TCP and never sends the upgrade request.
        let _silent = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let stalled = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must return before the handshake")
            .unwrap();
        assert!(stalled.id().into_inner() > 0);

        // The next peer is accepted and upgraded while the first one is
        // still silent.
        let server = tokio::spawn(async move {
            let conn = accept_ws(&mut transport).await;
            (conn, stalled)
        });
        let _client = tokio::time::timeout(Duration::from_secs(2), connect_client(&addr))
            .await
            .expect("second client must not wait on the first");
        let (conn, stalled) = server.await.unwrap();
        assert_ne!(conn.id(), stalled.id());

        let handshake =
            tokio::time::timeout(Duration::from_millis(100), stalled.complete()).await;
        assert!(handshake.is_err(), "silent peer never finishes its handshake");
    }

    #[tokio::test]
    async fn test_send_after_close_reports_connection_closed() {
        let (mut transport, addr) = bind_random().await;
        let server_handle =
            tokio::spawn(async move { accept_ws(&mut transport).await });
        let _client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        server_conn.close().await.unwrap();
        let result = server_conn.send(b"too late").await;
        assert!(
            matches!(result, Err(TransportError::ConnectionClosed(ref id)) if *id == server_conn.id().to_string()),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_websocket_accept_after_shutdown_fails() {
        let (mut transport, _addr) = bind_random().await;
        transport.shutdown().await.unwrap();

        let result = transport.accept().await;
        assert!(matches!(
            result,
            Err(TransportError::Shutdown)
        ));
    }
}
