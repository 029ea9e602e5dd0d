//! Outbound HTTP client for the remote country service, with optional
//! mutual TLS and round-robin balancing.

pub mod config;
pub mod directory;
pub mod events;
pub mod remote;
pub mod tls;

pub use config::{ClientConfig, KeyStoreType, SslConfig};
pub use directory::RemoteCountryDirectory;
pub use events::{ServerEvent, parse_event_stream};
pub use remote::RemoteClient;
