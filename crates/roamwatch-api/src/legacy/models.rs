// Legacy API response types
//
// Models for the UniFi controller's legacy JSON API. All responses are wrapped
// in the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware versions.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Station ──────────────────────────────────────────────────────────

/// Connected station (client device) from `stat/sta`.
///
/// Only the fields the presence tracker consumes are modeled explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationEntry {
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub is_wired: Option<bool>,
    /// Access point the station is associated with (wireless only).
    #[serde(default)]
    pub ap_mac: Option<String>,
    /// Uplink switch (wired only).
    #[serde(default)]
    pub sw_mac: Option<String>,
    #[serde(default)]
    pub sw_port: Option<i32>,
    #[serde(default)]
    pub rssi: Option<i32>,
    #[serde(default)]
    pub signal: Option<i32>,
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub uptime: Option<i64>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Infrastructure device ────────────────────────────────────────────

/// Infrastructure device (AP, switch, gateway) from `stat/device`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfraDevice {
    pub mac: String,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Virtual access points: the radio BSSIDs a gateway or AP broadcasts.
    /// Stations often report a radio BSSID rather than the device MAC.
    #[serde(default)]
    pub vap_table: Vec<VapEntry>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One radio broadcast from a device's `vap_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapEntry {
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub ap_mac: Option<String>,
    #[serde(default)]
    pub radio: Option<String>,
}

// ── IPS / IDS event ──────────────────────────────────────────────────

/// Raw intrusion-detection event from `stat/ips/event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpsEventEntry {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub unique_alertid: Option<String>,
    /// Event time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub inner_alert_signature: Option<String>,
    #[serde(default)]
    pub inner_alert_signature_id: Option<i64>,
    #[serde(default)]
    pub inner_alert_category: Option<String>,
    /// 1 = high, 2 = medium, 3 = low.
    #[serde(default)]
    pub inner_alert_severity: Option<i64>,
    #[serde(default)]
    pub inner_alert_action: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub src_ip: Option<String>,
    #[serde(default)]
    pub src_port: Option<i64>,
    #[serde(default)]
    pub dest_ip: Option<String>,
    #[serde(default)]
    pub dest_port: Option<i64>,
    #[serde(default)]
    pub proto: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
