//! Error type for the provider core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a bridge caller can observe.
///
/// Collaborator failures (persistence, permission) pass through the
/// [`Collaborator`](Self::Collaborator) variant unchanged; the core never
/// retries and never swallows them.
#[derive(Debug, Error)]
pub enum Error {
	/// Gated interface called while disconnected.
	#[error("not connected")]
	NotConnected,

	/// Gated interface called with a method no handler was registered for.
	#[error("interface method not implemented: {0}")]
	UnimplementedMethod(String),

	/// Bridge dispatch received a method name outside the fixed surface.
	#[error("unknown bridge method: {0}")]
	UnknownBridgeMethod(String),

	/// Bridge params did not match the shape the method expects.
	#[error("invalid bridge params: {0}")]
	InvalidParams(String),

	/// Connection info arrived but could not be parsed or validated.
	#[error("invalid connection info: {0}")]
	InvalidConnectionInfo(String),

	/// The connector popup was dismissed before completing the handshake.
	#[error("connector closed before completing the handshake")]
	ConnectorClosed,

	/// The connector reported a failure of its own.
	#[error("connector error: {0}")]
	ConnectorError(String),

	/// No connector liveness observed within the heartbeat bound.
	#[error("timed out waiting for connector liveness")]
	ConnectorTimeout,

	/// Silent reconnection found no persisted connection info.
	#[error("no saved connection")]
	NoSavedConnection,

	/// The permission collaborator rejected the caller.
	#[error("caller is not permissioned for the saved connection")]
	NotPermissioned,

	/// A popup handshake is already in flight; the new attempt is rejected.
	#[error("a popup handshake is already in flight")]
	HandshakeInFlight,

	/// The broadcast substrate went away under a live waiter.
	#[error("broadcast channel closed")]
	ChannelClosed,

	/// Failure raised by a persistence or permission collaborator,
	/// propagated unchanged.
	#[error(transparent)]
	Collaborator(#[from] anyhow::Error),
}
