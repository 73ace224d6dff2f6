//! Wire types and constants for the gangway handshake protocol.
//!
//! Both sides of the handshake (the provider core and any connector
//! implementation) depend on this crate so that topic names, peer roles,
//! and signal payloads cannot drift apart.
//!
//! # Main Types
//!
//! - [`ConnectorSignal`] - Lifecycle signal broadcast by the connector
//! - [`ErrorSignal`] - Error detail broadcast toward the connector
//! - [`HeartbeatPing`] - Liveness ping exchanged between peer roles
//! - [`ProviderMetadata`] - Static descriptive record of a provider
//! - [`SkappIdentity`] - Identity of the embedding application

mod metadata;
mod signal;

use std::time::Duration;

pub use metadata::{ProviderMetadata, SkappIdentity};
pub use signal::{ConnectorSignal, ErrorSignal, HeartbeatPing};

/// Topic on which the connector broadcasts serialized connection info.
pub const CONNECTION_INFO_TOPIC: &str = "connector-connection-info";

/// Topic on which the connector broadcasts its lifecycle signals.
pub const CONNECTOR_TOPIC: &str = "connector";

/// Topic on which the provider reports fatal protocol errors back to the
/// connector so the popup can close itself.
pub const ERROR_TOPIC: &str = "error";

/// Default bound on waiting for connector liveness.
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Interval between liveness pings within the timeout window.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);

/// Peer role in the liveness exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// The provider frame embedded in the skapp.
	Provider,
	/// The connector popup window.
	Connector,
}

impl Role {
	/// Returns the role name as used in topic strings.
	pub fn as_str(self) -> &'static str {
		match self {
			Role::Provider => "provider",
			Role::Connector => "connector",
		}
	}

	/// Returns the heartbeat topic this role publishes its pings on.
	pub fn heartbeat_topic(self) -> String {
		format!("heartbeat-{}", self.as_str())
	}
}
