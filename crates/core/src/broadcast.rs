//! Topic-keyed publish/subscribe port.
//!
//! The handshake signals between sibling windows travel over a global
//! side channel rather than a direct call. [`Broadcast`] models that
//! channel as string payloads on named topics, decoupled from the
//! concrete substrate (storage events in a browser, sockets or shared
//! memory elsewhere). [`MemoryBroadcast`] is the in-process
//! implementation used by local targets and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

/// One-shot cancel closure. Must be infallible; cancellation is
/// best-effort and never fails the caller.
pub type CancelFn = Box<dyn FnOnce() + Send>;

/// Topic-keyed publish/subscribe between windows of the same origin.
///
/// Delivery is fire-and-forget: `publish` does not report whether anyone
/// was listening, matching the storage-event substrate this abstracts.
pub trait Broadcast: Send + Sync {
	/// Registers a listener on `topic`. The returned [`Subscription`]
	/// receives every payload published after registration until its
	/// canceler runs or it is dropped.
	fn subscribe(&self, topic: &str) -> Subscription;

	/// Publishes `payload` to every current subscriber of `topic`.
	fn publish(&self, topic: &str, payload: &str);
}

/// A live listener registration on one topic.
///
/// The canceler can be split off with [`take_canceler`](Self::take_canceler)
/// so a race combinator can own de-registration while a waiter future owns
/// the receiving end. Dropping an un-split subscription de-registers too.
pub struct Subscription {
	rx: mpsc::UnboundedReceiver<String>,
	cancel: Option<CancelFn>,
}

impl Subscription {
	pub fn new(rx: mpsc::UnboundedReceiver<String>, cancel: CancelFn) -> Self {
		Self {
			rx,
			cancel: Some(cancel),
		}
	}

	/// Waits for the next payload. `None` means the substrate is gone.
	pub async fn recv(&mut self) -> Option<String> {
		self.rx.recv().await
	}

	/// Splits off the de-registration closure. Later calls return a no-op,
	/// so cancellation cannot run twice through this handle.
	pub fn take_canceler(&mut self) -> CancelFn {
		self.cancel.take().unwrap_or_else(|| Box::new(|| {}))
	}

	/// Prepends an observer to the canceler, so a wrapping [`Broadcast`]
	/// can watch de-registrations without replacing them.
	pub fn chain_canceler(&mut self, observe: impl FnOnce() + Send + 'static) {
		let inner = self.cancel.take();
		self.cancel = Some(Box::new(move || {
			observe();
			if let Some(inner) = inner {
				inner();
			}
		}));
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

/// In-process [`Broadcast`] backed by a lock-free topic registry.
#[derive(Clone, Default)]
pub struct MemoryBroadcast {
	inner: Arc<Topics>,
}

#[derive(Default)]
struct Topics {
	subscribers: DashMap<String, Vec<(u64, mpsc::UnboundedSender<String>)>>,
	next_id: AtomicU64,
}

impl MemoryBroadcast {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Broadcast for MemoryBroadcast {
	fn subscribe(&self, topic: &str) -> Subscription {
		let (tx, rx) = mpsc::unbounded_channel();
		let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
		self.inner
			.subscribers
			.entry(topic.to_owned())
			.or_default()
			.push((id, tx));

		let inner = Arc::clone(&self.inner);
		let topic = topic.to_owned();
		let cancel: CancelFn = Box::new(move || {
			if let Some(mut entry) = inner.subscribers.get_mut(&topic) {
				entry.retain(|(sub_id, _)| *sub_id != id);
			}
		});
		Subscription::new(rx, cancel)
	}

	fn publish(&self, topic: &str, payload: &str) {
		if let Some(mut entry) = self.inner.subscribers.get_mut(topic) {
			// Sending to a dropped receiver fails; prune those here.
			entry.retain(|(_, tx)| tx.send(payload.to_owned()).is_ok());
		}
	}
}
