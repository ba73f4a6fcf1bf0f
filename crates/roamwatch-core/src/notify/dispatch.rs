// Webhook delivery: one POST per (target, transition), payload shaped
// for the target's provider. Non-2xx responses count as failures so the
// notifier can log them.

use std::time::Duration;

use serde_json::{Value, json};

use crate::error::CoreError;
use crate::model::{Transition, TransitionKind, WebhookConfig, WebhookProvider};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Formats and POSTs notification payloads to third-party endpoints.
pub struct WebhookDispatcher {
    http: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new() -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Config {
                message: format!("failed to build webhook HTTP client: {e}"),
            })?;
        Ok(Self { http })
    }

    /// Wrap an existing client (tests, custom TLS policy).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST one transition to one webhook target.
    pub async fn deliver(
        &self,
        hook: &WebhookConfig,
        transition: &Transition,
    ) -> Result<(), CoreError> {
        let payload = payload_for(hook.provider, transition);

        let resp = self
            .http
            .post(&hook.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoreError::WebhookDelivery {
                name: hook.name.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::WebhookDelivery {
                name: hook.name.clone(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        Ok(())
    }
}

/// Human-readable one-liner shared by the chat-style providers.
pub fn format_message(t: &Transition) -> String {
    let device = t.device_label();

    match t.kind {
        TransitionKind::Connected => match &t.new_ap {
            Some(ap) => format!("{device} connected to {}", ap.label()),
            None => format!("{device} connected"),
        },
        TransitionKind::Roamed => {
            let old = t.old_ap.as_ref().map_or("?", |ap| ap.label());
            let new = t.new_ap.as_ref().map_or("?", |ap| ap.label());
            format!("{device} roamed from {old} to {new}")
        }
        TransitionKind::Disconnected => {
            let base = match &t.old_ap {
                Some(ap) => format!("{device} disconnected from {}", ap.label()),
                None => format!("{device} disconnected"),
            };
            match t.offline_secs {
                Some(secs) if secs > 0 => {
                    let ago = humantime::format_duration(Duration::from_secs(
                        u64::try_from(secs).unwrap_or(0),
                    ));
                    format!("{base} (last seen {ago} ago)")
                }
                _ => base,
            }
        }
    }
}

fn payload_for(provider: WebhookProvider, t: &Transition) -> Value {
    match provider {
        WebhookProvider::Generic => json!({
            "event": t.kind,
            "device": {
                "mac": t.mac,
                "name": t.device_name,
            },
            "site": t.site,
            "old_ap": t.old_ap.as_ref().map(ap_json),
            "new_ap": t.new_ap.as_ref().map(ap_json),
            "offline_seconds": t.offline_secs,
            "message": format_message(t),
            "timestamp": t.at.to_rfc3339(),
        }),
        WebhookProvider::Discord => json!({ "content": format_message(t) }),
        WebhookProvider::Slack => json!({ "text": format_message(t) }),
    }
}

fn ap_json(ap: &crate::model::ApRef) -> Value {
    json!({ "mac": ap.mac, "name": ap.name })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{ApRef, MacAddress};

    fn transition(kind: TransitionKind) -> Transition {
        Transition {
            device_id: 1,
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            device_name: Some("Kitchen Tablet".into()),
            site: "default".into(),
            kind,
            old_ap: Some(ApRef {
                mac: MacAddress::new("0a:0b:0c:0d:0e:0f"),
                name: Some("AP X".into()),
            }),
            new_ap: Some(ApRef {
                mac: MacAddress::new("0a:0b:0c:0d:0e:1f"),
                name: Some("AP Y".into()),
            }),
            offline_secs: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn roam_message_names_both_aps() {
        let msg = format_message(&transition(TransitionKind::Roamed));
        assert_eq!(msg, "Kitchen Tablet roamed from AP X to AP Y");
    }

    #[test]
    fn disconnect_message_includes_offline_duration() {
        let mut t = transition(TransitionKind::Disconnected);
        t.offline_secs = Some(90);
        let msg = format_message(&t);
        assert_eq!(
            msg,
            "Kitchen Tablet disconnected from AP X (last seen 1m 30s ago)"
        );
    }

    #[test]
    fn unnamed_device_falls_back_to_mac() {
        let mut t = transition(TransitionKind::Connected);
        t.device_name = None;
        let msg = format_message(&t);
        assert_eq!(msg, "aa:bb:cc:dd:ee:ff connected to AP Y");
    }

    #[test]
    fn generic_payload_carries_event_fields() {
        let t = transition(TransitionKind::Roamed);
        let payload = payload_for(WebhookProvider::Generic, &t);

        assert_eq!(payload["event"], "roamed");
        assert_eq!(payload["device"]["mac"], "aa:bb:cc:dd:ee:ff");
        assert_eq!(payload["old_ap"]["name"], "AP X");
        assert_eq!(payload["new_ap"]["name"], "AP Y");
    }

    #[test]
    fn discord_payload_is_content_only() {
        let t = transition(TransitionKind::Connected);
        let payload = payload_for(WebhookProvider::Discord, &t);
        assert!(payload.get("content").is_some());
        assert!(payload.get("event").is_none());
    }
}
