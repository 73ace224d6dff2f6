//! Collaborator ports the concrete provider must supply.
//!
//! The core has no implicit environment dependencies: persistence,
//! permission, and schema validation are injected capabilities. A
//! constructor that cannot be handed a working [`SessionStore`] has no
//! fallback, which replaces the original runtime storage probe.

use async_trait::async_trait;

use gangway_protocol::SkappIdentity;

use crate::error::Result;

/// Persistence port for connection info.
///
/// The core only reads and writes the opaque info type `T` through this
/// port; its failures surface to the bridge caller unchanged.
#[async_trait]
pub trait SessionStore<T>: Send + Sync {
	/// Returns previously persisted connection info, if any.
	async fn fetch(&self) -> Result<Option<T>>;

	/// Persists connection info from a successful popup handshake.
	async fn store(&self, info: &T) -> Result<()>;

	/// Removes any persisted connection info. Called on every disconnect,
	/// connected or not.
	async fn clear(&self) -> Result<()>;
}

/// Permission port for the silent reconnection path.
#[async_trait]
pub trait PermissionGate<T>: Send + Sync {
	/// Returns whether `identity` may reuse the persisted `info`.
	/// The identity record passes through here unmodified.
	async fn check(&self, info: &T, identity: &SkappIdentity) -> Result<bool>;
}

/// Semantic validation of freshly parsed connection info.
///
/// Parsing only proves the payload was well-formed JSON; this port
/// decides whether the decoded value is an acceptable connection for
/// this provider. Rejection fails the handshake as invalid info.
pub trait InfoValidator<T>: Send + Sync {
	/// Returns `Err(detail)` when `info` must be rejected.
	fn validate(&self, info: &T) -> std::result::Result<(), String>;
}

/// Validator that accepts any well-formed info.
///
/// For providers whose info type encodes all constraints in its serde
/// shape already.
pub struct AcceptAll;

impl<T> InfoValidator<T> for AcceptAll {
	fn validate(&self, _info: &T) -> std::result::Result<(), String> {
		Ok(())
	}
}
