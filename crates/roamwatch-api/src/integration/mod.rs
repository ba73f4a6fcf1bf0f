// Integration API surface (API-key auth, `/integration/v1/`).

mod client;
pub mod types;

pub use client::IntegrationClient;
