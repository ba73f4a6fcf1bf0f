use chrono::{DateTime, Utc};
use serde::Serialize;

use super::mac::MacAddress;

/// One continuous association of a device to one access point.
///
/// `disconnected_at = NULL` marks the open entry -- the association that
/// is still live. A device has at most one open entry at any time; the
/// planner guarantees it and a partial unique index enforces it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ConnectionHistoryEntry {
    pub id: i64,
    pub device_id: i64,
    pub ap_mac: MacAddress,
    pub ap_name: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub disconnected_at: Option<DateTime<Utc>>,
    /// Wall-clock seconds between `connected_at` and `disconnected_at`,
    /// computed when the entry is closed.
    pub duration_secs: Option<i64>,
    pub signal_dbm: Option<i64>,
}

impl ConnectionHistoryEntry {
    pub fn is_open(&self) -> bool {
        self.disconnected_at.is_none()
    }

    /// AP display label: friendly name when resolved, raw MAC otherwise.
    pub fn ap_label(&self) -> &str {
        self.ap_name.as_deref().unwrap_or_else(|| self.ap_mac.as_str())
    }
}
