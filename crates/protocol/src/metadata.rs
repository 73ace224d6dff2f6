//! Descriptive records exchanged at the bridge surface.

use serde::{Deserialize, Serialize};

/// Static descriptive record a provider exposes read-only to its parent.
///
/// Immutable after construction; `getProviderMetadata` is a pure read of
/// this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
	/// Display name of the provider.
	pub name: String,
	/// Origin the provider is served from.
	pub url: String,
	/// Relative path of the connector page, for the external router.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub connector_path: Option<String>,
}

/// Identity of the embedding application requesting a connection.
///
/// Caller-supplied, passed through unmodified to the permission check,
/// never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkappIdentity {
	/// Name the skapp identifies itself with.
	pub name: String,
	/// Origin of the embedding context.
	pub origin: String,
}
