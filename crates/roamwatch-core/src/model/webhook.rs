use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transition::TransitionKind;

/// Which payload shape a webhook target expects.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WebhookProvider {
    /// Full JSON payload, for anything that can parse it.
    Generic,
    /// Discord incoming webhook (`{"content": ...}`).
    Discord,
    /// Slack incoming webhook (`{"text": ...}`).
    Slack,
}

/// A configured outbound notification target.
///
/// Read by the notifier on every transition; mutated only by user CRUD.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WebhookConfig {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub provider: WebhookProvider,
    pub enabled: bool,
    pub on_connected: bool,
    pub on_disconnected: bool,
    pub on_roamed: bool,
    pub last_triggered: Option<DateTime<Utc>>,
}

impl WebhookConfig {
    /// Whether this target wants deliveries for the given event kind.
    pub fn wants(&self, kind: TransitionKind) -> bool {
        self.enabled
            && match kind {
                TransitionKind::Connected => self.on_connected,
                TransitionKind::Disconnected => self.on_disconnected,
                TransitionKind::Roamed => self.on_roamed,
            }
    }
}
