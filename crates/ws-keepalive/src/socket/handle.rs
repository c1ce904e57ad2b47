use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::command::SocketCommand;
use super::SocketActor;
use crate::config::KeepaliveConfig;
use crate::errors::{Result, SocketError};
use crate::transport::{Transport, WsTransport};
use crate::types::{CloseEvent, HandlerSlots, ReadyState};

const COMMAND_BUFFER: usize = 32;

/// Handle to a keepalive-wrapped connection.
///
/// One handle per connection, single use: the underlying transport is created
/// with the handle and never reassigned. Reconnecting means opening a new
/// socket. Dropping the handle tears the connection down.
pub struct KeepaliveSocket {
	sender: mpsc::Sender<SocketCommand>,
	state_rx: watch::Receiver<ReadyState>,
	handlers: Arc<Mutex<HandlerSlots>>,
	cancel_token: CancellationToken,
}

impl KeepaliveSocket {
	/// Open a WebSocket connection to `url` with heartbeats per `config`.
	///
	/// Returns immediately; connection failures surface asynchronously
	/// through the close callback, never as a synchronous error.
	#[must_use]
	pub fn open(url: impl Into<String>, config: KeepaliveConfig) -> Self {
		Self::with_transport(WsTransport::new(url), config)
	}

	/// Open over a caller-supplied transport implementation.
	#[must_use]
	pub fn with_transport<T: Transport>(transport: T, config: KeepaliveConfig) -> Self {
		let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
		let (state_tx, state_rx) = watch::channel(ReadyState::Connecting);
		let handlers = Arc::new(Mutex::new(HandlerSlots::default()));
		let cancel_token = CancellationToken::new();

		let actor = SocketActor::new(transport, &config, Arc::clone(&handlers), receiver, state_tx, cancel_token.clone());
		tokio::spawn(actor.run());

		Self {
			sender,
			state_rx,
			handlers,
			cancel_token,
		}
	}

	/// Assign the open handler, invoked once the connection transitions to
	/// open (after the heartbeat timer is armed).
	pub fn on_open(&self, handler: impl FnMut() + Send + 'static) {
		self.slots().on_open = Some(Box::new(handler));
	}

	/// Assign the message handler. Never invoked for the reserved `"ping"`
	/// and `"pong"` heartbeat payloads.
	pub fn on_message(&self, handler: impl FnMut(String) + Send + 'static) {
		self.slots().on_message = Some(Box::new(handler));
	}

	/// Assign the close handler, invoked exactly once with the transport's
	/// close code and reason, however the connection ended.
	pub fn on_close(&self, handler: impl FnMut(CloseEvent) + Send + 'static) {
		self.slots().on_close = Some(Box::new(handler));
	}

	/// Send an application payload, unchanged and uninspected.
	///
	/// # Errors
	/// Returns [`SocketError::TransportUnavailable`] unless the connection
	/// is currently open, and [`SocketError::Transport`] if the transport
	/// rejects the write.
	pub async fn send(&self, payload: impl Into<String>) -> Result<()> {
		let (reply, response) = oneshot::channel();
		let command = SocketCommand::Send { payload: payload.into(), reply };
		if self.sender.send(command).await.is_err() {
			return Err(SocketError::TransportUnavailable { state: self.ready_state() });
		}
		response.await.unwrap_or(Err(SocketError::TransportUnavailable { state: ReadyState::Closed }))
	}

	/// Close the connection with the given code and reason.
	///
	/// Stops the heartbeat before requesting transport closure. Idempotent:
	/// closing an already closed (or closing) connection returns `Ok`.
	///
	/// # Errors
	/// Returns [`SocketError::Transport`] if the transport fails the close
	/// handshake.
	pub async fn close(&self, code: u16, reason: impl Into<String>) -> Result<()> {
		let (reply, response) = oneshot::channel();
		let command = SocketCommand::Close {
			code,
			reason: reason.into(),
			reply,
		};
		if self.sender.send(command).await.is_err() {
			// Socket task already gone, so the connection is closed.
			return Ok(());
		}
		response.await.unwrap_or(Ok(()))
	}

	/// Current connection state
	#[must_use]
	pub fn ready_state(&self) -> ReadyState {
		*self.state_rx.borrow()
	}

	fn slots(&self) -> std::sync::MutexGuard<'_, HandlerSlots> {
		self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Drop for KeepaliveSocket {
	fn drop(&mut self) {
		self.cancel_token.cancel();
	}
}
