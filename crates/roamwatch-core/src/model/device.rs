use chrono::{DateTime, Utc};
use serde::Serialize;

use super::mac::MacAddress;

/// A device the user asked to track, with its last reconciled state.
///
/// Connection fields (`is_connected`, `current_*`, `last_seen`) are owned
/// by the reconciliation engine; everything else is user-owned
/// (add / rename / delete outside the tick).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrackedDevice {
    pub id: i64,
    pub mac: MacAddress,
    /// User-assigned display name.
    pub name: Option<String>,
    pub site: String,
    pub is_connected: bool,
    pub current_ap_mac: Option<MacAddress>,
    pub current_ap_name: Option<String>,
    pub current_ip: Option<String>,
    pub current_signal_dbm: Option<i64>,
    /// Last time the device appeared in a snapshot. Survives disconnects.
    pub last_seen: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
}

impl TrackedDevice {
    /// Name if the user gave one, otherwise the hardware address.
    pub fn display_label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.mac.as_str())
    }
}
