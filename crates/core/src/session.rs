//! Connection state machine and the gated interface registry.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};

/// Boxed async interface handler future.
pub type InterfaceFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// Registered interface handler: JSON params → async JSON result.
pub type InterfaceHandler = Arc<dyn Fn(Value) -> InterfaceFuture + Send + Sync>;

/// The single session a provider instance owns.
///
/// `Disconnected` (initial) ⇄ `Connected(info)`. Entering `Connected`
/// happens exactly once per successful handshake; `disconnect` returns to
/// the initial state, which is re-enterable.
pub struct ConnectionSession<T> {
	state: Mutex<State<T>>,
}

enum State<T> {
	Disconnected,
	Connected(T),
}

impl<T> Default for ConnectionSession<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> ConnectionSession<T> {
	/// Creates the session in its initial empty state.
	pub fn new() -> Self {
		Self {
			state: Mutex::new(State::Disconnected),
		}
	}

	pub fn is_connected(&self) -> bool {
		matches!(*self.state.lock(), State::Connected(_))
	}

	/// Transitions to `Connected` holding validated connection info.
	pub fn connect(&self, info: T) {
		*self.state.lock() = State::Connected(info);
	}

	/// Clears back to the initial empty state. Idempotent.
	pub fn disconnect(&self) {
		*self.state.lock() = State::Disconnected;
	}
}

impl<T: Clone> ConnectionSession<T> {
	/// Returns the live connection info, if connected.
	pub fn info(&self) -> Option<T> {
		match &*self.state.lock() {
			State::Connected(info) => Some(info.clone()),
			State::Disconnected => None,
		}
	}
}

/// Named async methods the skapp may invoke once connected.
///
/// Fixed at provider construction; [`IndexMap`] keeps registration order
/// stable for introspection.
#[derive(Default)]
pub struct InterfaceRegistry {
	handlers: IndexMap<String, InterfaceHandler>,
}

impl InterfaceRegistry {
	pub fn register(&mut self, method: impl Into<String>, handler: InterfaceHandler) {
		self.handlers.insert(method.into(), handler);
	}

	/// Invokes `method`, propagating the handler's own failure unchanged.
	///
	/// The caller is responsible for the connected-state gate; this only
	/// checks registration.
	pub async fn invoke(&self, method: &str, params: Value) -> Result<Value> {
		let handler = self
			.handlers
			.get(method)
			.ok_or_else(|| Error::UnimplementedMethod(method.to_owned()))?;
		handler(params).await
	}
}
