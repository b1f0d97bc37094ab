// openwebif-core: Domain layer between openwebif-api and the accessory host.

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod persist;
pub mod registry;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, InfoMenuAction, RemoteKey, VolumeStep};
pub use config::{ChannelDef, DeviceConfig, IdentityOverrides, VolumeDisplay};
pub use error::CoreError;
pub use persist::{JsonFileStore, MemoryStore, PersistError, PersistenceStore};
pub use registry::{ChannelEntry, ChannelRegistry};
pub use session::DeviceSession;

pub use model::{
    CachedState, Capability, CapabilityValue, DeviceIdentity, DeviceStatus, StateUpdate, SyncState,
};

// The endpoint type travels with the device config, so consumers only
// need this crate.
pub use openwebif_api::DeviceEndpoint;
