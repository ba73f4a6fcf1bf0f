//! Response types for the UniFi Network Integration API.
//!
//! Field names use camelCase via `#[serde(rename_all = "camelCase")]`.
//! Identifiers stay as strings -- the tracker never dereferences them
//! beyond equality checks.

use serde::Deserialize;
use serde_json::Value;

/// Paged list envelope used by every Integration list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub offset: i64,
    pub limit: i64,
    pub count: i64,
    pub total_count: i64,
    pub data: Vec<T>,
}

/// Site summary from `GET /v1/sites`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// The legacy site name (`"default"` on most controllers).
    #[serde(default)]
    pub internal_reference: Option<String>,
}

/// Connected client from `GET /v1/sites/{siteId}/clients`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `"WIRED"` or `"WIRELESS"`.
    #[serde(rename = "type", default)]
    pub client_type: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub connected_at: Option<String>,
    /// Device the client is associated with (AP for wireless, switch for wired).
    #[serde(default)]
    pub uplink_device_id: Option<String>,
    /// Access metadata object; shape varies by firmware, kept opaque.
    #[serde(default)]
    pub access: Option<Value>,
}

/// Infrastructure device from `GET /v1/sites/{siteId}/devices`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub id: String,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}
