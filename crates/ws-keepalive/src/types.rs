use std::fmt;

/// Lifecycle state of the underlying transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
	Connecting,
	Open,
	Closing,
	Closed,
}

impl fmt::Display for ReadyState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Connecting => write!(f, "Connecting"),
			Self::Open => write!(f, "Open"),
			Self::Closing => write!(f, "Closing"),
			Self::Closed => write!(f, "Closed"),
		}
	}
}

/// Well-known WebSocket close codes used by this crate
pub mod close_code {
	/// Normal closure
	pub const NORMAL: u16 = 1000;
	/// No status code was present in the close frame
	pub const NO_STATUS: u16 = 1005;
	/// Connection dropped without a close handshake
	pub const ABNORMAL: u16 = 1006;
}

/// Close information forwarded to the application, unchanged from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
	pub code: u16,
	pub reason: String,
}

impl CloseEvent {
	#[must_use]
	pub fn new(code: u16, reason: impl Into<String>) -> Self {
		Self { code, reason: reason.into() }
	}

	/// Close event for a connection that died without a close handshake
	#[must_use]
	pub fn abnormal(reason: impl Into<String>) -> Self {
		Self::new(close_code::ABNORMAL, reason)
	}
}

impl fmt::Display for CloseEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.code, self.reason)
	}
}

pub(crate) type OpenHandler = Box<dyn FnMut() + Send>;
pub(crate) type MessageHandler = Box<dyn FnMut(String) + Send>;
pub(crate) type CloseHandler = Box<dyn FnMut(CloseEvent) + Send>;

/// Application callback slots, written by the handle and read by the socket task.
///
/// Handlers run on the socket task one at a time, in delivery order. Reassigning
/// a slot from inside a running handler is not supported.
#[derive(Default)]
pub(crate) struct HandlerSlots {
	pub on_open: Option<OpenHandler>,
	pub on_message: Option<MessageHandler>,
	pub on_close: Option<CloseHandler>,
}
