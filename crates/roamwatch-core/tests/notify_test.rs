#![allow(clippy::unwrap_used)]
// Notifier + dispatcher tests against a wiremock endpoint.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roamwatch_core::{
    ApRef, CoreError, MacAddress, Notifier, Store, Transition, TransitionKind, WebhookConfig,
    WebhookDispatcher, WebhookProvider,
};

fn transition(kind: TransitionKind) -> Transition {
    Transition {
        device_id: 1,
        mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
        device_name: Some("Kitchen Tablet".into()),
        site: "default".into(),
        kind,
        old_ap: None,
        new_ap: Some(ApRef {
            mac: MacAddress::new("0a:0b:0c:0d:0e:0f"),
            name: Some("AP X".into()),
        }),
        offline_secs: None,
        at: Utc::now(),
    }
}

fn hook(url: String, provider: WebhookProvider) -> WebhookConfig {
    WebhookConfig {
        id: 1,
        name: "test-hook".into(),
        url,
        provider,
        enabled: true,
        on_connected: true,
        on_disconnected: true,
        on_roamed: true,
        last_triggered: None,
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────

#[tokio::test]
async fn generic_delivery_posts_full_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({
            "event": "connected",
            "device": { "mac": "aa:bb:cc:dd:ee:ff", "name": "Kitchen Tablet" },
            "new_ap": { "name": "AP X" },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = WebhookDispatcher::new().unwrap();
    dispatcher
        .deliver(
            &hook(format!("{}/hook", server.uri()), WebhookProvider::Generic),
            &transition(TransitionKind::Connected),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn discord_delivery_posts_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({
            "content": "Kitchen Tablet connected to AP X",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = WebhookDispatcher::new().unwrap();
    dispatcher
        .deliver(
            &hook(format!("{}/hook", server.uri()), WebhookProvider::Discord),
            &transition(TransitionKind::Connected),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
        .mount(&server)
        .await;

    let dispatcher = WebhookDispatcher::new().unwrap();
    let result = dispatcher
        .deliver(
            &hook(server.uri(), WebhookProvider::Generic),
            &transition(TransitionKind::Connected),
        )
        .await;

    match result {
        Err(CoreError::WebhookDelivery { ref message, .. }) => {
            assert!(message.contains("500"), "expected status in message: {message}");
        }
        other => panic!("expected WebhookDelivery error, got: {other:?}"),
    }
}

// ── Notifier loop ───────────────────────────────────────────────────

#[tokio::test]
async fn notifier_delivers_matching_hooks_and_records_trigger_time() {
    let server = MockServer::start().await;

    // Only roam deliveries expected; the connected-only hook must not fire
    // for the roamed transition below.
    Mock::given(method("POST"))
        .and(path("/roams"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connects"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Store::open_in_memory().await.unwrap();
    let roam_hook = store
        .add_webhook(
            "roams",
            &format!("{}/roams", server.uri()),
            WebhookProvider::Generic,
            false,
            false,
            true,
        )
        .await
        .unwrap();
    store
        .add_webhook(
            "connects",
            &format!("{}/connects", server.uri()),
            WebhookProvider::Generic,
            true,
            false,
            false,
        )
        .await
        .unwrap();

    let (tx, rx) = tokio::sync::broadcast::channel(16);
    let cancel = CancellationToken::new();
    let handle =
        Notifier::new(store.clone(), WebhookDispatcher::new().unwrap()).spawn(rx, cancel.clone());

    tx.send(Arc::new(transition(TransitionKind::Roamed))).unwrap();

    // Give the loop a moment to drain, then stop it.
    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();
    handle.await.unwrap();

    let touched = store.webhook_by_id(roam_hook.id).await.unwrap().unwrap();
    assert!(touched.last_triggered.is_some(), "delivery time recorded");
}
