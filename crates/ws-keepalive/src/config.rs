use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default period between outgoing heartbeat pings
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepaliveConfig {
	/// Period between outgoing heartbeat pings while the connection is open
	pub heartbeat_interval: Duration,
}

impl KeepaliveConfig {
	#[must_use]
	pub const fn from_secs(secs: u64) -> Self {
		Self {
			heartbeat_interval: Duration::from_secs(secs),
		}
	}

	/// Interval actually used by the heartbeat. A zero interval falls back
	/// to [`DEFAULT_HEARTBEAT_INTERVAL`].
	#[must_use]
	pub fn effective_interval(&self) -> Duration {
		if self.heartbeat_interval.is_zero() {
			DEFAULT_HEARTBEAT_INTERVAL
		} else {
			self.heartbeat_interval
		}
	}
}

impl Default for KeepaliveConfig {
	fn default() -> Self {
		Self {
			heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
		}
	}
}
