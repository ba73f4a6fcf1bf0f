//! One-shot control commands: status, test-connection, refresh.

use owo_colors::OwoColorize;
use serde::Serialize;

use roamwatch_config::Settings;
use roamwatch_core::Engine;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::open_store;

// ── status ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusReport {
    site: String,
    devices_tracked: usize,
    devices_connected: usize,
    last_activity: Option<chrono::DateTime<chrono::Utc>>,
    webhooks: usize,
    threat_events: usize,
    database: String,
}

pub async fn status(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    let devices = store.devices_for_site(&settings.site_id).await?;
    let webhooks = store.list_webhooks().await?;
    let threats = store.threats_for_site(&settings.site_id, 10_000).await?;

    let report = StatusReport {
        site: settings.site_id.clone(),
        devices_tracked: devices.len(),
        devices_connected: devices.iter().filter(|d| d.is_connected).count(),
        last_activity: devices.iter().filter_map(|d| d.last_seen).max(),
        webhooks: webhooks.len(),
        threat_events: threats.len(),
        database: settings.database_path.display().to_string(),
    };

    let color = output::should_color(&global.color);
    let detail = |r: &StatusReport| {
        let connected = if color {
            r.devices_connected.green().to_string()
        } else {
            r.devices_connected.to_string()
        };
        [
            format!("Site:           {}", r.site),
            format!("Devices:        {} tracked, {connected} online", r.devices_tracked),
            format!("Last activity:  {}", output::ago(r.last_activity)),
            format!("Webhooks:       {}", r.webhooks),
            format!("Threat events:  {}", r.threat_events),
            format!("Database:       {}", r.database),
        ]
        .join("\n")
    };

    let out = output::render_single(&global.output, &report, detail, |r| r.site.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── test-connection ─────────────────────────────────────────────────

pub async fn test_connection(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    settings.validate()?;

    let source = roamwatch_api::connect_source(&settings.source_config()?).await?;
    let snapshot = source.fetch_associations(&settings.site_id).await?;

    output::print_output(
        &format!(
            "Controller reachable: {} stations associated on site '{}'",
            snapshot.len(),
            settings.site_id
        ),
        global.quiet,
    );
    Ok(())
}

// ── refresh (one tick, right now) ───────────────────────────────────

pub async fn refresh(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    settings.validate()?;

    let store = open_store(settings).await?;
    let source = roamwatch_api::connect_source(&settings.source_config()?).await?;
    let engine = Engine::new(settings.engine_config(), store.clone(), source);

    let summary = engine.run_tick().await?;

    output::print_output(
        &format!(
            "Tick complete: {} tracked, {} associated, {} transitions",
            summary.tracked, summary.associated, summary.transitions
        ),
        global.quiet,
    );
    Ok(())
}
