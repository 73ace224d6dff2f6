//! First-settles-wins combinator over cancelable waiters.
//!
//! The combinator owns calling every participant's canceler exactly once,
//! whichever branch settles and even if the race future itself is dropped
//! mid-flight. Cleanup lives in a drop guard rather than ad hoc future
//! chaining so no exit path can skip it.

use futures_util::future::{BoxFuture, select_all};

use crate::broadcast::CancelFn;
use crate::error::Result;

/// One race participant: a settling future plus its cancel capability.
pub struct Waiter<T> {
	name: &'static str,
	future: BoxFuture<'static, Result<T>>,
	cancel: CancelFn,
}

impl<T> Waiter<T> {
	pub fn new(name: &'static str, future: BoxFuture<'static, Result<T>>, cancel: CancelFn) -> Self {
		Self {
			name,
			future,
			cancel,
		}
	}
}

/// Runs all waiters concurrently; the first to settle decides the outcome.
///
/// Later settlements are discarded with their futures. Every waiter's
/// canceler runs exactly once before this returns (or when the returned
/// future is dropped by an abandoning caller).
///
/// # Panics
///
/// Panics if `waiters` is empty.
pub async fn first_settled<T>(waiters: Vec<Waiter<T>>) -> Result<T> {
	assert!(!waiters.is_empty(), "race requires at least one waiter");

	let mut guard = CancelAll::default();
	let mut futures = Vec::with_capacity(waiters.len());
	for waiter in waiters {
		guard.push(waiter.name, waiter.cancel);
		futures.push(waiter.future);
	}

	let (outcome, winner, _losers) = select_all(futures).await;
	tracing::debug!(winner = guard.name(winner), ok = outcome.is_ok(), "race settled");
	// guard drops here, canceling every participant exactly once
	outcome
}

/// Runs each pending canceler exactly once on drop.
#[derive(Default)]
struct CancelAll {
	entries: Vec<(&'static str, Option<CancelFn>)>,
}

impl CancelAll {
	fn push(&mut self, name: &'static str, cancel: CancelFn) {
		self.entries.push((name, Some(cancel)));
	}

	fn name(&self, index: usize) -> &'static str {
		self.entries.get(index).map(|(name, _)| *name).unwrap_or("?")
	}
}

impl Drop for CancelAll {
	fn drop(&mut self) {
		for (name, cancel) in &mut self.entries {
			if let Some(cancel) = cancel.take() {
				tracing::debug!(waiter = *name, "canceling waiter");
				cancel();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	use super::*;
	use crate::error::Error;

	fn counting_cancel(counter: &Arc<AtomicUsize>) -> CancelFn {
		let counter = Arc::clone(counter);
		Box::new(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		})
	}

	fn sleeper(ms: u64, value: Result<u32>) -> BoxFuture<'static, Result<u32>> {
		Box::pin(async move {
			tokio::time::sleep(Duration::from_millis(ms)).await;
			value
		})
	}

	#[tokio::test]
	async fn fastest_waiter_wins_and_all_cancel_once() {
		let cancels = Arc::new(AtomicUsize::new(0));
		let waiters = vec![
			Waiter::new("slow", sleeper(200, Ok(1)), counting_cancel(&cancels)),
			Waiter::new("fast", sleeper(10, Ok(2)), counting_cancel(&cancels)),
			Waiter::new("never", Box::pin(std::future::pending()), counting_cancel(&cancels)),
		];

		assert_eq!(first_settled(waiters).await.unwrap(), 2);
		assert_eq!(cancels.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn first_error_decides_the_race() {
		let cancels = Arc::new(AtomicUsize::new(0));
		let waiters = vec![
			Waiter::new("ok-later", sleeper(200, Ok(1)), counting_cancel(&cancels)),
			Waiter::new(
				"err-now",
				sleeper(10, Err(Error::ConnectorClosed)),
				counting_cancel(&cancels),
			),
		];

		assert!(matches!(
			first_settled(waiters).await,
			Err(Error::ConnectorClosed)
		));
		assert_eq!(cancels.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn abandoned_race_still_cancels_every_waiter() {
		let cancels = Arc::new(AtomicUsize::new(0));
		let waiters: Vec<Waiter<u32>> = vec![
			Waiter::new("never-a", Box::pin(std::future::pending()), counting_cancel(&cancels)),
			Waiter::new("never-b", Box::pin(std::future::pending()), counting_cancel(&cancels)),
		];

		let race = first_settled(waiters);
		// Poll once, then abandon the race entirely.
		tokio::select! {
			biased;
			_ = race => panic!("pending waiters cannot settle"),
			() = tokio::task::yield_now() => {}
		}

		assert_eq!(cancels.load(Ordering::SeqCst), 2);
	}
}
