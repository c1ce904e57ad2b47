use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Reserved heartbeat request payload
pub(crate) const PING: &str = "ping";
/// Reserved heartbeat reply payload
pub(crate) const PONG: &str = "pong";

/// Classification of an inbound payload against the reserved control vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inbound {
	Ping,
	Pong,
	Application,
}

/// Exact, case-sensitive match; anything else is application data.
pub(crate) fn classify(payload: &str) -> Inbound {
	match payload {
		PING => Inbound::Ping,
		PONG => Inbound::Pong,
		_ => Inbound::Application,
	}
}

/// Periodic ping scheduler, armed only while the connection is open.
///
/// At most one ticker exists at a time; `arm` on an armed heartbeat is a
/// no-op and `disarm` is idempotent.
pub(crate) struct Heartbeat {
	period: Duration,
	ticker: Option<Interval>,
}

impl Heartbeat {
	pub const fn new(period: Duration) -> Self {
		Self { period, ticker: None }
	}

	/// Start the ticker. The first tick fires one full period from now.
	pub fn arm(&mut self) {
		if self.ticker.is_some() {
			return;
		}
		let mut ticker = interval_at(Instant::now() + self.period, self.period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
		self.ticker = Some(ticker);
	}

	pub fn disarm(&mut self) {
		self.ticker = None;
	}

	/// Wait for the next tick. Pends forever while disarmed so it can sit
	/// unconditionally in a `select!` branch.
	pub async fn tick(&mut self) {
		match self.ticker.as_mut() {
			Some(ticker) => {
				ticker.tick().await;
			}
			None => std::future::pending().await,
		}
	}
}
