use chrono::{DateTime, Utc};
use serde::Serialize;

use super::mac::MacAddress;

/// The three state changes a tick can detect for a device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransitionKind {
    Connected,
    Disconnected,
    Roamed,
}

/// Reference to an access point as seen at transition time.
#[derive(Debug, Clone, Serialize)]
pub struct ApRef {
    pub mac: MacAddress,
    pub name: Option<String>,
}

impl ApRef {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.mac.as_str())
    }
}

/// One state change detected by the reconciliation engine, carrying
/// everything downstream consumers (UI sessions, webhooks) need without
/// a store round-trip.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub device_id: i64,
    pub mac: MacAddress,
    pub device_name: Option<String>,
    pub site: String,
    pub kind: TransitionKind,
    /// AP the device was on before the tick (disconnect / roam).
    pub old_ap: Option<ApRef>,
    /// AP the device is on after the tick (connect / roam).
    pub new_ap: Option<ApRef>,
    /// For `disconnected`: seconds since the device was last seen when
    /// absence was observed -- the "offline for" figure notification
    /// text wants.
    pub offline_secs: Option<i64>,
    pub at: DateTime<Utc>,
}

impl Transition {
    /// Device display label: user name when set, raw MAC otherwise.
    pub fn device_label(&self) -> &str {
        self.device_name
            .as_deref()
            .unwrap_or_else(|| self.mac.as_str())
    }
}
