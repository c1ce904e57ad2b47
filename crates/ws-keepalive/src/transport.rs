pub mod ws;

pub use ws::WsTransport;

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{CloseEvent, ReadyState};

/// Inbound events delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
	/// A text payload from the peer, delivered verbatim
	Message(String),
	/// The connection finished closing, whether locally or peer initiated
	Closed(CloseEvent),
}

/// Contract for the underlying bidirectional message-stream connection.
///
/// The socket task drives exactly one transport for its whole lifetime:
/// `connect` once, then `next_event` until it yields `Closed` or `None`.
#[async_trait]
pub trait Transport: Send + 'static {
	/// Drive the initial connection attempt to completion.
	async fn connect(&mut self) -> Result<()>;

	/// Send a text payload. Fails unless the connection is currently open.
	async fn send(&mut self, payload: String) -> Result<()>;

	/// Begin closing with the given code and reason. Closing an already
	/// closed connection is a successful no-op.
	async fn close(&mut self, code: u16, reason: String) -> Result<()>;

	/// Next inbound event, or `None` once the stream is exhausted.
	///
	/// Must be cancellation safe: the socket task polls this inside a
	/// `select!` loop and may drop the future between events.
	async fn next_event(&mut self) -> Option<TransportEvent>;

	/// Current connection state
	fn ready_state(&self) -> ReadyState;
}
