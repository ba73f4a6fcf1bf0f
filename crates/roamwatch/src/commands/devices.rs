//! Device tracking command handlers.

use tabled::Tabled;

use roamwatch_config::Settings;
use roamwatch_core::{ConnectionHistoryEntry, MacAddress, TrackedDevice};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::open_store;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "AP")]
    ap: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&TrackedDevice> for DeviceRow {
    fn from(d: &TrackedDevice) -> Self {
        Self {
            id: d.id,
            name: d.name.clone().unwrap_or_default(),
            mac: d.mac.to_string(),
            status: if d.is_connected { "online" } else { "offline" }.into(),
            ap: d
                .current_ap_name
                .clone()
                .or_else(|| d.current_ap_mac.as_ref().map(ToString::to_string))
                .unwrap_or_default(),
            ip: d.current_ip.clone().unwrap_or_default(),
            last_seen: output::ago(d.last_seen),
        }
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "AP")]
    ap: String,
    #[tabled(rename = "Connected")]
    connected_at: String,
    #[tabled(rename = "Disconnected")]
    disconnected_at: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Signal")]
    signal: String,
}

impl From<&ConnectionHistoryEntry> for HistoryRow {
    fn from(h: &ConnectionHistoryEntry) -> Self {
        Self {
            ap: h.ap_label().to_owned(),
            connected_at: h.connected_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            disconnected_at: h
                .disconnected_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "(open)".into()),
            duration: output::duration(h.duration_secs),
            signal: h
                .signal_dbm
                .map(|s| format!("{s} dBm"))
                .unwrap_or_default(),
        }
    }
}

fn detail(d: &TrackedDevice) -> String {
    let mut lines = vec![
        format!("ID:         {}", d.id),
        format!("Name:       {}", d.name.as_deref().unwrap_or("-")),
        format!("MAC:        {}", d.mac),
        format!("Site:       {}", d.site),
        format!(
            "Status:     {}",
            if d.is_connected { "online" } else { "offline" }
        ),
    ];
    if let Some(ref ap) = d.current_ap_name {
        lines.push(format!("AP:         {ap}"));
    } else if let Some(ref mac) = d.current_ap_mac {
        lines.push(format!("AP:         {mac}"));
    }
    if let Some(ref ip) = d.current_ip {
        lines.push(format!("IP:         {ip}"));
    }
    if let Some(signal) = d.current_signal_dbm {
        lines.push(format!("Signal:     {signal} dBm"));
    }
    lines.push(format!("Last seen:  {}", output::ago(d.last_seen)));
    lines.push(format!("Added:      {}", d.added_at.format("%Y-%m-%d %H:%M:%S")));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: DevicesArgs,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = open_store(settings).await?;
    let site = settings.site_id.as_str();

    match args.command {
        DevicesCommand::Add { mac, name } => {
            let mac = MacAddress::new(&mac);
            if !mac.is_valid() {
                return Err(CliError::Validation {
                    field: "mac".into(),
                    reason: format!("'{mac}' is not a hardware address"),
                });
            }

            let device = store.add_device(&mac, name.as_deref(), site).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::List => {
            let devices = store.devices_for_site(site).await?;
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.mac.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Remove { device } => {
            let found = store.find_device(site, &device).await?;
            store.delete_device(found.id).await?;
            output::print_output(
                &format!("Device {} removed from tracking", found.display_label()),
                global.quiet,
            );
            Ok(())
        }

        DevicesCommand::Rename { device, name } => {
            let found = store.find_device(site, &device).await?;
            store.rename_device(found.id, Some(&name)).await?;
            output::print_output(&format!("Device {} renamed to '{name}'", found.mac), global.quiet);
            Ok(())
        }

        DevicesCommand::History {
            device,
            limit,
            offset,
        } => {
            let found = store.find_device(site, &device).await?;
            let history = store.history_for_device(found.id, limit, offset).await?;
            let out = output::render_list(
                &global.output,
                &history,
                |h| HistoryRow::from(h),
                |h| h.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
