// ws-keepalive Library
//
// Liveness-maintaining wrapper around a WebSocket connection. While the
// connection is open it sends a literal "ping" text payload once per
// configured interval, answers peer "ping" with "pong", and filters both
// reserved payloads out of the application-visible message stream. The
// wrapper never reconnects and never closes a connection for silence; close
// codes are forwarded to the application unchanged.

pub mod config;
pub mod errors;
mod heartbeat;
pub mod socket;
pub mod transport;
pub mod types;

pub use config::{KeepaliveConfig, DEFAULT_HEARTBEAT_INTERVAL};
pub use errors::{Result, SocketError};
pub use socket::KeepaliveSocket;
pub use transport::{Transport, TransportEvent, WsTransport};
pub use types::{close_code, CloseEvent, ReadyState};
