#[cfg(test)]
mod tests {
	use futures_util::{SinkExt, StreamExt};
	use std::future::Future;
	use std::time::Duration;
	use tokio::net::{TcpListener, TcpStream};
	use tokio::sync::mpsc;
	use tokio::time::timeout;
	use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
	use tokio_tungstenite::tungstenite::protocol::CloseFrame;
	use tokio_tungstenite::tungstenite::Message;
	use tokio_tungstenite::WebSocketStream;
	use ws_keepalive::{CloseEvent, KeepaliveConfig, KeepaliveSocket, ReadyState};

	type ServerSocket = WebSocketStream<TcpStream>;

	/// Spawn a one-shot WebSocket server and return its ws:// url
	async fn spawn_server<F, Fut>(handler: F) -> String
	where
		F: FnOnce(ServerSocket) -> Fut + Send + 'static,
		Fut: Future<Output = ()> + Send,
	{
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			let (stream, _) = listener.accept().await.unwrap();
			let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
			handler(ws).await;
		});
		format!("ws://{addr}")
	}

	async fn expect_text(ws: &mut ServerSocket, expected: &str) {
		let message = timeout(Duration::from_secs(5), ws.next()).await.expect("timed out waiting for client message").unwrap().unwrap();
		assert_eq!(message.into_text().unwrap().as_str(), expected);
	}

	async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
		timeout(Duration::from_secs(5), rx.recv()).await.expect("timed out waiting for callback").expect("callback channel closed")
	}

	struct Callbacks {
		opened: mpsc::UnboundedReceiver<()>,
		messages: mpsc::UnboundedReceiver<String>,
		closed: mpsc::UnboundedReceiver<CloseEvent>,
	}

	fn install_callbacks(socket: &KeepaliveSocket) -> Callbacks {
		let (open_tx, opened) = mpsc::unbounded_channel();
		let (message_tx, messages) = mpsc::unbounded_channel();
		let (close_tx, closed) = mpsc::unbounded_channel();
		socket.on_open(move || {
			let _ = open_tx.send(());
		});
		socket.on_message(move |payload| {
			let _ = message_tx.send(payload);
		});
		socket.on_close(move |event| {
			let _ = close_tx.send(event);
		});
		Callbacks { opened, messages, closed }
	}

	#[tokio::test]
	async fn test_round_trip_with_live_server() {
		let url = spawn_server(|mut ws| async move {
			expect_text(&mut ws, "hello").await;
			ws.send(Message::text("welcome")).await.unwrap();
			// Drain until the client's close handshake completes.
			while let Some(Ok(_)) = ws.next().await {}
		})
		.await;

		let socket = KeepaliveSocket::open(url, KeepaliveConfig::from_secs(60));
		let mut callbacks = install_callbacks(&socket);

		recv(&mut callbacks.opened).await;
		assert_eq!(socket.ready_state(), ReadyState::Open);

		socket.send("hello").await.unwrap();
		assert_eq!(recv(&mut callbacks.messages).await, "welcome");

		socket.close(1000, "done").await.unwrap();
		let close = recv(&mut callbacks.closed).await;
		assert_eq!(close.code, 1000);
		assert_eq!(socket.ready_state(), ReadyState::Closed);
	}

	#[tokio::test]
	async fn test_server_ping_gets_pong_and_is_suppressed() {
		let url = spawn_server(|mut ws| async move {
			ws.send(Message::text("ping")).await.unwrap();
			expect_text(&mut ws, "pong").await;
			ws.send(Message::text("done")).await.unwrap();
			let frame = CloseFrame {
				code: CloseCode::Normal,
				reason: "bye".into(),
			};
			ws.close(Some(frame)).await.unwrap();
			while let Some(Ok(_)) = ws.next().await {}
		})
		.await;

		let socket = KeepaliveSocket::open(url, KeepaliveConfig::from_secs(60));
		let mut callbacks = install_callbacks(&socket);

		recv(&mut callbacks.opened).await;

		// The ping never surfaces; the next application payload does.
		assert_eq!(recv(&mut callbacks.messages).await, "done");

		let close = recv(&mut callbacks.closed).await;
		assert_eq!(close, CloseEvent::new(1000, "bye"));
	}

	#[tokio::test]
	async fn test_client_heartbeat_reaches_server() {
		let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
		let url = spawn_server(move |mut ws| async move {
			expect_text(&mut ws, "ping").await;
			ws.send(Message::text("pong")).await.unwrap();
			let _ = seen_tx.send(());
			while let Some(Ok(_)) = ws.next().await {}
		})
		.await;

		let socket = KeepaliveSocket::open(url, KeepaliveConfig::from_secs(1));
		let mut callbacks = install_callbacks(&socket);

		recv(&mut callbacks.opened).await;
		recv(&mut seen_rx).await;

		// The pong reply stayed out of the application stream.
		assert!(callbacks.messages.try_recv().is_err());

		socket.close(1000, "done").await.unwrap();
	}

	#[tokio::test]
	async fn test_connection_refused_surfaces_through_close_callback() {
		// Bind and immediately drop a listener to get a dead port.
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let socket = KeepaliveSocket::open(format!("ws://{addr}"), KeepaliveConfig::default());
		let mut callbacks = install_callbacks(&socket);

		let close = recv(&mut callbacks.closed).await;
		assert_eq!(close.code, ws_keepalive::close_code::ABNORMAL);
		assert!(callbacks.opened.try_recv().is_err());
		assert_eq!(socket.ready_state(), ReadyState::Closed);
	}
}
