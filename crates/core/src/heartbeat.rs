//! Liveness monitor between two peer roles.
//!
//! Each side publishes a ping on its own `heartbeat-<role>` topic every
//! interval and watches the peer's topic. Silence beyond the bound means
//! the peer is gone. The monitor never resolves successfully: in a race
//! it can only lose to another waiter or settle with
//! [`ConnectorTimeout`](crate::Error::ConnectorTimeout).

use std::sync::Arc;
use std::time::Duration;

use gangway_protocol::{HeartbeatPing, Role};

use crate::broadcast::{Broadcast, CancelFn, Subscription};
use crate::error::{Error, Result};

/// Exchanges liveness pings with a named peer until silence exceeds the
/// bound.
pub struct HeartbeatMonitor {
	broadcast: Arc<dyn Broadcast>,
	local: Role,
	peer: Role,
	interval: Duration,
	timeout: Duration,
	sub: Subscription,
}

impl HeartbeatMonitor {
	/// Registers on the peer's heartbeat topic and prepares to ping on the
	/// local one.
	pub fn new(
		broadcast: Arc<dyn Broadcast>,
		local: Role,
		peer: Role,
		interval: Duration,
		timeout: Duration,
	) -> Self {
		let sub = broadcast.subscribe(&peer.heartbeat_topic());
		Self {
			broadcast,
			local,
			peer,
			interval,
			timeout,
			sub,
		}
	}

	/// Splits off the listener de-registration closure.
	pub fn take_canceler(&mut self) -> CancelFn {
		self.sub.take_canceler()
	}

	/// Pings and listens until the peer falls silent for the full bound.
	///
	/// Always returns an error: [`Error::ConnectorTimeout`] on expiry, or
	/// [`Error::ChannelClosed`] if the substrate goes away.
	pub async fn run(mut self) -> Result<()> {
		let ping = match serde_json::to_string(&HeartbeatPing { role: self.local }) {
			Ok(ping) => ping,
			Err(_) => String::new(),
		};
		let local_topic = self.local.heartbeat_topic();

		let mut ticker = tokio::time::interval(self.interval);
		let mut deadline = Box::pin(tokio::time::sleep(self.timeout));

		loop {
			tokio::select! {
				_ = ticker.tick() => {
					self.broadcast.publish(&local_topic, &ping);
				}
				observed = self.sub.recv() => match observed {
					Some(_) => {
						// Peer is alive; push the silence deadline out.
						deadline
							.as_mut()
							.reset(tokio::time::Instant::now() + self.timeout);
					}
					None => return Err(Error::ChannelClosed),
				},
				() = deadline.as_mut() => {
					tracing::warn!(
						peer = self.peer.as_str(),
						timeout_ms = self.timeout.as_millis() as u64,
						"no liveness observed within bound"
					);
					return Err(Error::ConnectorTimeout);
				}
			}
		}
	}
}
