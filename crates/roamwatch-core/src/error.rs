// ── Core error taxonomy ──
//
// Three fates for an error: skip the tick and retry next interval
// (TransientFetch), roll back the tick and retry next interval (Storage),
// or refuse to start (Config). Nothing a single tick does may kill the
// process.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Talking to the controller failed (network, auth, bad payload).
    /// The tick is skipped; the next interval retries.
    #[error("controller fetch failed: {source}")]
    TransientFetch {
        #[source]
        source: roamwatch_api::Error,
    },

    /// The store rejected a read or commit. A mid-tick failure rolls the
    /// whole tick back, leaving state as of the previous tick.
    #[error("storage error: {source}")]
    Storage {
        #[from]
        source: sqlx::Error,
    },

    /// Schema migration failed while opening the store.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Missing or invalid settings. Fatal at startup, never per-tick.
    #[error("configuration error: {message}")]
    Config { message: String },

    // ── Row-level errors (user CRUD, outside the tick) ───────────────
    #[error("device {mac} is already tracked on site '{site}'")]
    DeviceExists { mac: String, site: String },

    #[error("device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("webhook not found: {id}")]
    WebhookNotFound { id: i64 },

    /// A webhook endpoint rejected or never received a delivery.
    /// Logged and dropped -- delivery is fire-and-forget.
    #[error("webhook delivery to '{name}' failed: {message}")]
    WebhookDelivery { name: String, message: String },
}

impl From<roamwatch_api::Error> for CoreError {
    fn from(source: roamwatch_api::Error) -> Self {
        Self::TransientFetch { source }
    }
}

impl CoreError {
    /// Whether the next tick may simply retry this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetch { .. } | Self::Storage { .. })
    }
}
