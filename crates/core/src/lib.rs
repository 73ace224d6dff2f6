//! Provider-side handshake core.
//!
//! A provider runs inside an embedded frame controlled by a third-party
//! skapp and brokers a trusted session with a local backend. First-time
//! setup goes through a connector popup: the provider races the popup's
//! connection-info broadcast against its lifecycle signal and a
//! heartbeat bound, with guaranteed de-registration of every waiter.
//! Later visits reconnect silently from persisted info after a
//! permission check.
//!
//! # Main Types
//!
//! - [`Provider`] - Session owner, handshake orchestrator, bridge surface
//! - [`Broadcast`] / [`MemoryBroadcast`] - Topic-keyed signaling port
//! - [`EventChannel`] - One-shot cancelable wait on a topic
//! - [`HeartbeatMonitor`] - Peer liveness bound
//! - [`SessionStore`] / [`PermissionGate`] / [`InfoValidator`] - Injected
//!   collaborator ports
//! - [`Error`] - Everything a bridge caller can observe going wrong

pub mod broadcast;
mod error;
pub mod event_channel;
mod handshake;
pub mod heartbeat;
pub mod ports;
pub mod race;
mod session;

pub use broadcast::{Broadcast, CancelFn, MemoryBroadcast, Subscription};
pub use error::{Error, Result};
pub use event_channel::EventChannel;
pub use handshake::{BridgeMethod, HandshakeConfig, Provider, ProviderBuilder};
pub use heartbeat::HeartbeatMonitor;
pub use ports::{AcceptAll, InfoValidator, PermissionGate, SessionStore};
pub use session::{ConnectionSession, InterfaceFuture, InterfaceHandler, InterfaceRegistry};

pub use gangway_protocol as protocol;
pub use gangway_protocol::{ProviderMetadata, SkappIdentity};
