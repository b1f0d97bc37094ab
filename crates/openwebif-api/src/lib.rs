// openwebif-api: Async Rust client for the OpenWebif set-top-box HTTP API

pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod transport;

mod control;
mod services;
mod status;

pub use client::OpenWebifClient;
pub use endpoint::DeviceEndpoint;
pub use error::Error;
pub use models::{DeviceInfo, PowerAction, ServiceBouquet, StatusInfo, Subservice};
pub use transport::TransportConfig;
