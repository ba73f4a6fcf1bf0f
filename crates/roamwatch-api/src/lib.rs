// roamwatch-api: Async client for UniFi controller APIs (Legacy + Integration).
//
// The only contract the rest of the workspace cares about is
// [`AssociationSource`]: "give me everything currently associated on this
// site". Both API styles implement it; `connect_source` picks one at
// configuration time.

pub mod auth;
pub mod error;
pub mod integration;
pub mod legacy;
pub mod source;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use integration::IntegrationClient;
pub use legacy::LegacyClient;
pub use source::{
    Association, AssociationSnapshot, AssociationSource, SourceConfig, SourceCredentials,
    connect_session, connect_source, normalize_mac,
};
pub use transport::{TlsMode, TransportConfig};
