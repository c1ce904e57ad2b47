pub(crate) mod command;
pub mod handle;

pub use handle::KeepaliveSocket;

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use command::SocketCommand;

use crate::config::KeepaliveConfig;
use crate::errors::SocketError;
use crate::heartbeat::{classify, Heartbeat, Inbound, PING, PONG};
use crate::transport::{Transport, TransportEvent};
use crate::types::{CloseEvent, HandlerSlots, ReadyState};

/// Outcome of the connecting phase
enum Establish {
	Opened,
	Failed(SocketError),
	LocalClose { code: u16, reason: String },
	Cancelled,
}

/// One step of the open-connection event loop
enum Step {
	Tick,
	Command(Option<SocketCommand>),
	Event(Option<TransportEvent>),
	Cancelled,
}

/// Socket task that owns the transport and the heartbeat timer.
///
/// Every callback and timer tick runs here, one at a time, in the order the
/// transport and timer deliver them.
pub(crate) struct SocketActor<T: Transport> {
	transport: T,
	heartbeat: Heartbeat,
	handlers: Arc<Mutex<HandlerSlots>>,
	commands: mpsc::Receiver<SocketCommand>,
	state_tx: watch::Sender<ReadyState>,
	cancel_token: CancellationToken,
}

impl<T: Transport> SocketActor<T> {
	pub fn new(
		transport: T,
		config: &KeepaliveConfig,
		handlers: Arc<Mutex<HandlerSlots>>,
		commands: mpsc::Receiver<SocketCommand>,
		state_tx: watch::Sender<ReadyState>,
		cancel_token: CancellationToken,
	) -> Self {
		Self {
			transport,
			heartbeat: Heartbeat::new(config.effective_interval()),
			handlers,
			commands,
			state_tx,
			cancel_token,
		}
	}

	pub async fn run(mut self) {
		match self.establish().await {
			Establish::Opened => {}
			Establish::Failed(err) => {
				warn!(error = %err, "connection attempt failed");
				self.state_tx.send_replace(ReadyState::Closed);
				self.dispatch_close(CloseEvent::abnormal(err.to_string()));
				return;
			}
			Establish::LocalClose { code, reason } => {
				let _ = self.transport.close(code, reason.clone()).await;
				self.state_tx.send_replace(ReadyState::Closed);
				self.dispatch_close(CloseEvent::new(code, reason));
				return;
			}
			Establish::Cancelled => {
				self.state_tx.send_replace(ReadyState::Closed);
				return;
			}
		}

		// The timer must be armed before the open callback runs, so side
		// effects in that callback observe an active keepalive.
		self.heartbeat.arm();
		self.state_tx.send_replace(ReadyState::Open);
		self.dispatch_open();
		info!("connection open, heartbeat armed");

		self.drive().await;
	}

	/// Drive the connect attempt while still answering commands.
	async fn establish(&mut self) -> Establish {
		let connect = self.transport.connect();
		tokio::pin!(connect);
		loop {
			tokio::select! {
				() = self.cancel_token.cancelled() => return Establish::Cancelled,
				result = &mut connect => {
					return match result {
						Ok(()) => Establish::Opened,
						Err(err) => Establish::Failed(err),
					};
				}
				command = self.commands.recv() => match command {
					Some(SocketCommand::Send { reply, .. }) => {
						let _ = reply.send(Err(SocketError::TransportUnavailable { state: ReadyState::Connecting }));
					}
					Some(SocketCommand::Close { code, reason, reply }) => {
						let _ = reply.send(Ok(()));
						return Establish::LocalClose { code, reason };
					}
					None => return Establish::Cancelled,
				},
			}
		}
	}

	async fn drive(&mut self) {
		loop {
			let step = tokio::select! {
				() = self.cancel_token.cancelled() => Step::Cancelled,
				() = self.heartbeat.tick() => Step::Tick,
				command = self.commands.recv() => Step::Command(command),
				event = self.transport.next_event() => Step::Event(event),
			};

			match step {
				Step::Cancelled | Step::Command(None) => {
					self.heartbeat.disarm();
					break;
				}

				Step::Tick => {
					// A tick can race a closing connection; send only if
					// the transport is open right now.
					if self.transport.ready_state() == ReadyState::Open {
						match self.transport.send(PING.to_owned()).await {
							Ok(()) => debug!("heartbeat ping sent"),
							Err(err) => warn!(error = %err, "heartbeat ping failed"),
						}
					}
				}

				Step::Command(Some(SocketCommand::Send { payload, reply })) => {
					let state = self.transport.ready_state();
					let result = if state == ReadyState::Open {
						self.transport.send(payload).await
					} else {
						Err(SocketError::TransportUnavailable { state })
					};
					let _ = reply.send(result);
				}

				Step::Command(Some(SocketCommand::Close { code, reason, reply })) => {
					// Heartbeat stops first, then the transport closes.
					self.heartbeat.disarm();
					self.state_tx.send_replace(ReadyState::Closing);
					let result = self.transport.close(code, reason).await;
					let _ = reply.send(result);
					// The closed event arrives through the transport stream.
				}

				Step::Event(Some(TransportEvent::Message(payload))) => match classify(&payload) {
					Inbound::Ping => {
						debug!("peer ping received, replying pong");
						if let Err(err) = self.transport.send(PONG.to_owned()).await {
							warn!(error = %err, "pong reply failed");
						}
					}
					Inbound::Pong => debug!("heartbeat pong received"),
					Inbound::Application => self.dispatch_message(payload),
				},

				Step::Event(Some(TransportEvent::Closed(event))) => {
					self.heartbeat.disarm();
					self.state_tx.send_replace(ReadyState::Closed);
					info!(code = event.code, reason = %event.reason, "connection closed");
					self.dispatch_close(event);
					break;
				}

				Step::Event(None) => {
					self.heartbeat.disarm();
					self.state_tx.send_replace(ReadyState::Closed);
					self.dispatch_close(CloseEvent::abnormal("transport stream ended"));
					break;
				}
			}
		}
	}

	fn dispatch_open(&self) {
		if let Some(handler) = self.slots().on_open.as_mut() {
			handler();
		}
	}

	fn dispatch_message(&self, payload: String) {
		if let Some(handler) = self.slots().on_message.as_mut() {
			handler(payload);
		}
	}

	fn dispatch_close(&self, event: CloseEvent) {
		if let Some(handler) = self.slots().on_close.as_mut() {
			handler(event);
		}
	}

	fn slots(&self) -> std::sync::MutexGuard<'_, HandlerSlots> {
		self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
