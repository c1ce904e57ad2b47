use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;
use ws_keepalive::{KeepaliveConfig, KeepaliveSocket};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt().with_max_level(Level::DEBUG).with_target(false).init();

	let url = std::env::args().nth(1).unwrap_or_else(|| "ws://127.0.0.1:8080/ws".to_owned());
	println!("connecting to {url}");

	let socket = KeepaliveSocket::open(url, KeepaliveConfig::from_secs(30));

	socket.on_open(|| println!("connected"));
	socket.on_message(|payload| println!("<- {payload}"));

	let (closed_tx, mut closed_rx) = mpsc::unbounded_channel();
	socket.on_close(move |event| {
		let _ = closed_tx.send(event);
	});

	tokio::time::sleep(Duration::from_millis(500)).await;
	socket.send("hello from ws-keepalive").await?;

	tokio::select! {
		event = closed_rx.recv() => {
			if let Some(event) = event {
				println!("connection closed: {event}");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			socket.close(1000, "client shutting down").await?;
			if let Some(event) = closed_rx.recv().await {
				println!("connection closed: {event}");
			}
		}
	}

	Ok(())
}
