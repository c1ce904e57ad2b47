use thiserror::Error;

use crate::types::ReadyState;

/// Result type alias for socket operations
pub type Result<T> = std::result::Result<T, SocketError>;

#[derive(Debug, Error)]
pub enum SocketError {
	/// Send or close attempted while the transport is not open
	#[error("transport unavailable (current state: {state})")]
	TransportUnavailable { state: ReadyState },

	/// Failure reported by the underlying transport
	#[error("transport failure: {0}")]
	Transport(String),
}
