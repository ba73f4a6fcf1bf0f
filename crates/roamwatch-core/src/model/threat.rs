use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the controller's IPS did about a flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThreatAction {
    /// Traffic was dropped.
    Block,
    /// Traffic was allowed through with an alert.
    Alert,
}

/// A persisted intrusion-detection event.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ThreatEvent {
    pub id: i64,
    /// The controller's own event identifier -- the dedupe key across polls.
    pub controller_event_id: String,
    pub site: String,
    pub occurred_at: DateTime<Utc>,
    pub signature: String,
    pub category: Option<String>,
    /// 1 = high, 2 = medium, 3 = low.
    pub severity: i64,
    pub action: ThreatAction,
    pub src_ip: Option<String>,
    pub src_port: Option<i64>,
    pub dest_ip: Option<String>,
    pub dest_port: Option<i64>,
    pub protocol: Option<String>,
    pub message: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

/// A threat event parsed from the controller feed, not yet stored.
#[derive(Debug, Clone)]
pub struct NewThreatEvent {
    pub controller_event_id: String,
    pub site: String,
    pub occurred_at: DateTime<Utc>,
    pub signature: String,
    pub category: Option<String>,
    pub severity: i64,
    pub action: ThreatAction,
    pub src_ip: Option<String>,
    pub src_port: Option<i64>,
    pub dest_ip: Option<String>,
    pub dest_port: Option<i64>,
    pub protocol: Option<String>,
    pub message: Option<String>,
}
