use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::{Transport, TransportEvent};
use crate::errors::{Result, SocketError};
use crate::types::{close_code, CloseEvent, ReadyState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport backed by `tokio-tungstenite`.
///
/// Protocol-level ping/pong frames are answered by tungstenite itself and
/// never surface here; only text and binary payloads become events.
pub struct WsTransport {
	url: String,
	state: ReadyState,
	stream: Option<WsStream>,
}

impl WsTransport {
	#[must_use]
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			state: ReadyState::Connecting,
			stream: None,
		}
	}

	/// Connection endpoint this transport was created for
	#[must_use]
	pub fn url(&self) -> &str {
		&self.url
	}
}

#[async_trait]
impl Transport for WsTransport {
	async fn connect(&mut self) -> Result<()> {
		match connect_async(&self.url).await {
			Ok((stream, _response)) => {
				self.stream = Some(stream);
				self.state = ReadyState::Open;
				Ok(())
			}
			Err(err) => {
				self.state = ReadyState::Closed;
				Err(SocketError::Transport(err.to_string()))
			}
		}
	}

	async fn send(&mut self, payload: String) -> Result<()> {
		if self.state != ReadyState::Open {
			return Err(SocketError::TransportUnavailable { state: self.state });
		}
		let stream = self.stream.as_mut().ok_or(SocketError::TransportUnavailable { state: ReadyState::Connecting })?;
		stream.send(Message::Text(payload.into())).await.map_err(|err| SocketError::Transport(err.to_string()))
	}

	async fn close(&mut self, code: u16, reason: String) -> Result<()> {
		match self.state {
			ReadyState::Closing | ReadyState::Closed => Ok(()),
			ReadyState::Connecting | ReadyState::Open => {
				let Some(stream) = self.stream.as_mut() else {
					self.state = ReadyState::Closed;
					return Ok(());
				};
				self.state = ReadyState::Closing;
				let frame = CloseFrame {
					code: CloseCode::from(code),
					reason: reason.into(),
				};
				match stream.close(Some(frame)).await {
					Ok(()) => Ok(()),
					Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
						self.state = ReadyState::Closed;
						Ok(())
					}
					Err(err) => Err(SocketError::Transport(err.to_string())),
				}
			}
		}
	}

	async fn next_event(&mut self) -> Option<TransportEvent> {
		if self.state == ReadyState::Closed {
			return None;
		}
		let stream = self.stream.as_mut()?;
		loop {
			match stream.next().await {
				Some(Ok(Message::Text(text))) => return Some(TransportEvent::Message(text.as_str().to_owned())),
				Some(Ok(Message::Binary(bytes))) => return Some(TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned())),
				Some(Ok(Message::Close(frame))) => {
					self.state = ReadyState::Closed;
					let event = frame.map_or_else(
						|| CloseEvent::new(close_code::NO_STATUS, ""),
						|frame| CloseEvent::new(u16::from(frame.code), frame.reason.as_str()),
					);
					return Some(TransportEvent::Closed(event));
				}
				// Protocol-level frames, already handled by tungstenite
				Some(Ok(other)) => debug!(kind = ?other, "skipping non-payload frame"),
				Some(Err(err)) => {
					self.state = ReadyState::Closed;
					return Some(TransportEvent::Closed(CloseEvent::abnormal(err.to_string())));
				}
				None => {
					self.state = ReadyState::Closed;
					return Some(TransportEvent::Closed(CloseEvent::abnormal("connection reset")));
				}
			}
		}
	}

	fn ready_state(&self) -> ReadyState {
		self.state
	}
}
