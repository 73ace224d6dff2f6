//! One-shot, cancelable wait on a named broadcast topic.

use std::sync::Arc;

use crate::broadcast::{Broadcast, CancelFn, Subscription};
use crate::error::{Error, Result};

/// A one-shot wait for the next payload on a topic.
///
/// Consumes at most one payload per attempt: [`wait`](Self::wait) takes
/// `self`, so a second delivery on the same topic cannot be observed
/// through this channel. The canceler de-registers the underlying
/// listener and must be invoked (or the channel dropped) on every exit
/// path of a handshake attempt.
pub struct EventChannel {
	sub: Subscription,
	topic: String,
}

impl EventChannel {
	/// Registers a listener on `topic`.
	pub fn open(broadcast: &Arc<dyn Broadcast>, topic: &str) -> Self {
		Self {
			sub: broadcast.subscribe(topic),
			topic: topic.to_owned(),
		}
	}

	/// Splits off the listener de-registration closure.
	pub fn take_canceler(&mut self) -> CancelFn {
		self.sub.take_canceler()
	}

	/// Resolves with the first payload published after registration.
	pub async fn wait(mut self) -> Result<String> {
		match self.sub.recv().await {
			Some(payload) => {
				tracing::debug!(topic = %self.topic, "one-shot broadcast received");
				Ok(payload)
			}
			None => Err(Error::ChannelClosed),
		}
	}
}
