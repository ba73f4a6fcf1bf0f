//! The tracking daemon: engine + notifier (+ threat monitor), running
//! until SIGINT. Shutdown lets the in-flight tick finish its commit.

use std::sync::Arc;

use tracing::{info, warn};

use roamwatch_api::connect_session;
use roamwatch_config::Settings;
use roamwatch_core::{Engine, Notifier, ThreatMonitor, WebhookDispatcher};

use crate::error::CliError;

use super::open_store;

pub async fn handle(settings: &Settings) -> Result<(), CliError> {
    settings.validate()?;

    let store = open_store(settings).await?;
    let source_config = settings.source_config()?;

    info!(
        controller = settings.controller_url.as_deref().unwrap_or_default(),
        site = %settings.site_id,
        "connecting to controller"
    );
    let source = roamwatch_api::connect_source(&source_config).await?;

    let engine = Engine::new(settings.engine_config(), store.clone(), source);

    let notifier = Notifier::new(store.clone(), WebhookDispatcher::new()?);
    let notifier_handle = notifier.spawn(engine.subscribe_transitions(), engine.cancel_token());

    engine.start().await;

    // The IPS feed only exists on the legacy API surface, so the threat
    // monitor needs a session login even though associations may come
    // through the Integration API.
    let threat_monitor = if settings.threats_enabled {
        if settings.uses_session_auth() {
            let feed = Arc::new(connect_session(&source_config).await?);
            let monitor = ThreatMonitor::new(settings.threat_config(), store.clone(), feed);
            monitor.start().await;
            Some(monitor)
        } else {
            warn!("threats_enabled requires username/password credentials; threat feed disabled");
            None
        }
    } else {
        None
    };

    info!("roamwatch serving; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    engine.shutdown().await;
    if let Some(monitor) = threat_monitor {
        monitor.shutdown().await;
    }
    let _ = notifier_handle.await;
    store.close().await;

    Ok(())
}
