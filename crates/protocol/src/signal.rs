//! Signal payloads exchanged over broadcast topics during the handshake.
//!
//! All payloads travel as JSON strings because the reference substrate is
//! a storage-event side channel; any substrate that can carry a string
//! can carry these.

use serde::{Deserialize, Serialize};

use crate::Role;

/// Lifecycle signal broadcast by the connector on the `connector` topic.
///
/// Either outcome ends the handshake; the connector is expected to close
/// itself afterwards and is not notified further.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectorSignal {
	/// The popup was dismissed before the handshake completed.
	Closed,
	/// The connector reported a failure of its own.
	Error {
		/// Human-readable failure description.
		message: String,
	},
}

/// Error detail broadcast by the provider on the `error` topic.
///
/// Sent when connection info arrives but cannot be parsed or validated,
/// so the connector knows to close itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSignal {
	/// Human-readable description of what was wrong with the payload.
	pub message: String,
}

/// Liveness ping exchanged between peer roles on `heartbeat-<role>` topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatPing {
	/// Role of the sender.
	pub role: Role,
}
