//! Handshake orchestration and the fixed bridge surface.
//!
//! [`Provider`] owns the one [`ConnectionSession`] of this frame and runs
//! the two ways into it: the popup handshake (a race between the
//! connection-info broadcast, the connector lifecycle signal, and a
//! heartbeat bound) and the silent path (reuse persisted info after a
//! permission check). The embedding parent reaches it only through the
//! five methods of [`Provider::dispatch`].


use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use gangway_protocol::{
	CONNECTION_INFO_TOPIC, CONNECTOR_TOPIC, ConnectorSignal, DEFAULT_HEARTBEAT_INTERVAL,
	DEFAULT_HEARTBEAT_TIMEOUT, ERROR_TOPIC, ErrorSignal, ProviderMetadata, Role, SkappIdentity,
};

use crate::broadcast::Broadcast;
use crate::error::{Error, Result};
use crate::event_channel::EventChannel;
use crate::heartbeat::HeartbeatMonitor;
use crate::ports::{InfoValidator, PermissionGate, SessionStore};
use crate::race::{self, Waiter};
use crate::session::{ConnectionSession, InterfaceHandler, InterfaceRegistry};

/// Timing knobs for the popup handshake's heartbeat waiter.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
	/// Interval between liveness pings.
	pub heartbeat_interval: Duration,
	/// Bound on peer silence before the handshake times out.
	pub heartbeat_timeout: Duration,
}

impl Default for HandshakeConfig {
	fn default() -> Self {
		Self {
			heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
			heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
		}
	}
}

/// The provider core: session state, handshake protocol, bridge surface.
///
/// `T` is the provider's opaque connection-info type; the core only moves
/// it between the wire, the validator, and the persistence port.
pub struct Provider<T> {
	metadata: ProviderMetadata,
	session: ConnectionSession<T>,
	interface: InterfaceRegistry,
	broadcast: Arc<dyn Broadcast>,
	store: Arc<dyn SessionStore<T>>,
	permissions: Arc<dyn PermissionGate<T>>,
	validator: Arc<dyn InfoValidator<T>>,
	config: HandshakeConfig,
	popup_in_flight: AtomicBool,
}

/// Builder for [`Provider`]; interface methods and config are fixed at
/// [`build`](Self::build).
pub struct ProviderBuilder<T> {
	provider: Provider<T>,
}

impl<T> ProviderBuilder<T> {
	/// Registers a named async interface method reachable through
	/// `callInterface` once connected.
	pub fn interface_method(mut self, name: impl Into<String>, handler: InterfaceHandler) -> Self {
		self.provider.interface.register(name, handler);
		self
	}

	/// Overrides the default heartbeat timing.
	pub fn config(mut self, config: HandshakeConfig) -> Self {
		self.provider.config = config;
		self
	}

	pub fn build(self) -> Provider<T> {
		self.provider
	}
}

impl<T> Provider<T>
where
	T: serde::de::DeserializeOwned + Send + Sync + 'static,
{
	/// Starts building a provider from its required collaborators.
	///
	/// Every capability is injected; the core performs no environment
	/// probing of its own.
	pub fn builder(
		metadata: ProviderMetadata,
		broadcast: Arc<dyn Broadcast>,
		store: Arc<dyn SessionStore<T>>,
		permissions: Arc<dyn PermissionGate<T>>,
		validator: Arc<dyn InfoValidator<T>>,
	) -> ProviderBuilder<T> {
		ProviderBuilder {
			provider: Provider {
				metadata,
				session: ConnectionSession::new(),
				interface: InterfaceRegistry::default(),
				broadcast,
				store,
				permissions,
				validator,
				config: HandshakeConfig::default(),
				popup_in_flight: AtomicBool::new(false),
			},
		}
	}

	/// Runs the popup handshake: races the connection-info broadcast, the
	/// connector lifecycle signal, and the heartbeat bound.
	///
	/// On success the parsed info is persisted and the session transitions
	/// to connected. On any failure the session is untouched. All three
	/// waiters are de-registered before this returns either way.
	pub async fn connect_popup(&self, identity: &SkappIdentity) -> Result<()> {
		let _slot = self.acquire_popup_slot()?;
		tracing::debug!(
			skapp = %identity.name,
			origin = %identity.origin,
			"popup handshake started"
		);

		let waiters = vec![
			self.info_waiter(),
			self.lifecycle_waiter(),
			self.heartbeat_waiter(),
		];
		let info = race::first_settled(waiters).await?;

		self.store.store(&info).await?;
		self.session.connect(info);
		tracing::debug!("popup handshake complete");
		Ok(())
	}

	/// Re-establishes a session from persisted info, without a popup.
	///
	/// Sequential: fetch, permission-check, transition. Never persists
	/// anything new and produces no broadcast traffic.
	pub async fn connect_silent(&self, identity: &SkappIdentity) -> Result<()> {
		let info = self
			.store
			.fetch()
			.await?
			.ok_or(Error::NoSavedConnection)?;
		if !self.permissions.check(&info, identity).await? {
			return Err(Error::NotPermissioned);
		}
		self.session.connect(info);
		tracing::debug!(skapp = %identity.name, "silent reconnection complete");
		Ok(())
	}

	/// Clears persisted info, then unconditionally returns the session to
	/// disconnected. Idempotent.
	pub async fn disconnect(&self) -> Result<()> {
		let cleared = self.store.clear().await;
		self.session.disconnect();
		cleared
	}

	/// Invokes a registered interface method; gated on connected state.
	pub async fn call_interface(&self, method: &str, params: Value) -> Result<Value> {
		if !self.session.is_connected() {
			return Err(Error::NotConnected);
		}
		self.interface.invoke(method, params).await
	}

	/// Pure read of the immutable metadata record.
	pub fn metadata(&self) -> &ProviderMetadata {
		&self.metadata
	}

	/// Whether the session is currently connected.
	pub fn is_connected(&self) -> bool {
		self.session.is_connected()
	}

	fn acquire_popup_slot(&self) -> Result<PopupSlot<'_>> {
		self.popup_in_flight
			.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
			.map_err(|_| Error::HandshakeInFlight)?;
		Ok(PopupSlot {
			flag: &self.popup_in_flight,
		})
	}

	fn info_waiter(&self) -> Waiter<T> {
		let mut channel = EventChannel::open(&self.broadcast, CONNECTION_INFO_TOPIC);
		let cancel = channel.take_canceler();
		let broadcast = Arc::clone(&self.broadcast);
		let validator = Arc::clone(&self.validator);
		let future = async move {
			let raw = channel.wait().await?;
			let info: T = match serde_json::from_str(&raw) {
				Ok(info) => info,
				Err(err) => return Err(reject_info(&*broadcast, err.to_string())),
			};
			if let Err(detail) = validator.validate(&info) {
				return Err(reject_info(&*broadcast, detail));
			}
			Ok(info)
		};
		Waiter::new("connection-info", Box::pin(future), cancel)
	}

	fn lifecycle_waiter(&self) -> Waiter<T> {
		let mut channel = EventChannel::open(&self.broadcast, CONNECTOR_TOPIC);
		let cancel = channel.take_canceler();
		let future = async move {
			let raw = channel.wait().await?;
			// The connector closes itself on either outcome; no reply.
			match serde_json::from_str::<ConnectorSignal>(&raw) {
				Ok(ConnectorSignal::Closed) => Err(Error::ConnectorClosed),
				Ok(ConnectorSignal::Error { message }) => Err(Error::ConnectorError(message)),
				Err(err) => Err(Error::ConnectorError(format!(
					"unreadable lifecycle signal: {err}"
				))),
			}
		};
		Waiter::new("connector-lifecycle", Box::pin(future), cancel)
	}

	fn heartbeat_waiter(&self) -> Waiter<T> {
		let mut monitor = HeartbeatMonitor::new(
			Arc::clone(&self.broadcast),
			Role::Provider,
			Role::Connector,
			self.config.heartbeat_interval,
			self.config.heartbeat_timeout,
		);
		let cancel = monitor.take_canceler();
		let future = async move {
			monitor.run().await?;
			Err(Error::ConnectorTimeout)
		};
		Waiter::new("heartbeat", Box::pin(future), cancel)
	}
}

/// Fails the handshake over bad connection info and tells the connector
/// why, so the popup can close itself. The notification is best-effort.
fn reject_info(broadcast: &dyn Broadcast, detail: String) -> Error {
	tracing::warn!(detail = %detail, "rejecting connection info");
	if let Ok(payload) = serde_json::to_string(&ErrorSignal {
		message: detail.clone(),
	}) {
		broadcast.publish(ERROR_TOPIC, &payload);
	}
	Error::InvalidConnectionInfo(detail)
}

/// Releases the single popup-handshake slot on every exit path.
struct PopupSlot<'a> {
	flag: &'a AtomicBool,
}

impl Drop for PopupSlot<'_> {
	fn drop(&mut self) {
		self.flag.store(false, Ordering::SeqCst);
	}
}

/// The five bridge operations reachable from the embedding parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMethod {
	CallInterface,
	ConnectPopup,
	ConnectSilent,
	Disconnect,
	GetProviderMetadata,
}

impl BridgeMethod {
	/// Maps a wire method name onto the fixed surface.
	pub fn parse(name: &str) -> Result<Self> {
		match name {
			"callInterface" => Ok(Self::CallInterface),
			"connectPopup" => Ok(Self::ConnectPopup),
			"connectSilent" => Ok(Self::ConnectSilent),
			"disconnect" => Ok(Self::Disconnect),
			"getProviderMetadata" => Ok(Self::GetProviderMetadata),
			other => Err(Error::UnknownBridgeMethod(other.to_owned())),
		}
	}
}

/// Accepted shapes for `callInterface` params: a bare method name, or a
/// method name with handler params.
#[derive(Deserialize)]
#[serde(untagged)]
enum CallInterfaceParams {
	Name(String),
	Full {
		method: String,
		#[serde(default)]
		params: Value,
	},
}

impl<T> Provider<T>
where
	T: serde::de::DeserializeOwned + Send + Sync + 'static,
{
	/// Dispatches one bridge call by method name.
	///
	/// This is the entire surface the cross-window transport may expose
	/// to the parent; anything else fails as
	/// [`Error::UnknownBridgeMethod`].
	pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value> {
		match BridgeMethod::parse(method)? {
			BridgeMethod::CallInterface => {
				let call: CallInterfaceParams = serde_json::from_value(params)
					.map_err(|err| Error::InvalidParams(err.to_string()))?;
				let (method, params) = match call {
					CallInterfaceParams::Name(method) => (method, Value::Null),
					CallInterfaceParams::Full { method, params } => (method, params),
				};
				self.call_interface(&method, params).await
			}
			BridgeMethod::ConnectPopup => {
				let identity = parse_identity(params)?;
				self.connect_popup(&identity).await?;
				Ok(Value::Null)
			}
			BridgeMethod::ConnectSilent => {
				let identity = parse_identity(params)?;
				self.connect_silent(&identity).await?;
				Ok(Value::Null)
			}
			BridgeMethod::Disconnect => {
				self.disconnect().await?;
				Ok(Value::Null)
			}
			BridgeMethod::GetProviderMetadata => serde_json::to_value(&self.metadata)
				.map_err(|err| Error::InvalidParams(err.to_string())),
		}
	}
}

fn parse_identity(params: Value) -> Result<SkappIdentity> {
	serde_json::from_value(params).map_err(|err| Error::InvalidParams(err.to_string()))
}
