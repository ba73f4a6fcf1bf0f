//! Intrusion-detection event viewing.

use tabled::Tabled;

use roamwatch_config::Settings;
use roamwatch_core::ThreatEvent;

use crate::cli::{GlobalOpts, ThreatsArgs, ThreatsCommand};
use crate::error::CliError;
use crate::output;

use super::open_store;

#[derive(Tabled)]
struct ThreatRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Sev")]
    severity: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Signature")]
    signature: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
}

fn endpoint(ip: Option<&str>, port: Option<i64>) -> String {
    match (ip, port) {
        (Some(ip), Some(port)) => format!("{ip}:{port}"),
        (Some(ip), None) => ip.to_owned(),
        _ => "-".into(),
    }
}

impl From<&ThreatEvent> for ThreatRow {
    fn from(t: &ThreatEvent) -> Self {
        let severity = match t.severity {
            1 => "high",
            2 => "medium",
            _ => "low",
        };

        Self {
            time: t.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            severity: severity.into(),
            action: t.action.to_string(),
            signature: t.signature.clone(),
            source: endpoint(t.src_ip.as_deref(), t.src_port),
            destination: endpoint(t.dest_ip.as_deref(), t.dest_port),
        }
    }
}

pub async fn handle(
    args: ThreatsArgs,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    match args.command {
        ThreatsCommand::List { limit } => {
            let events = store.threats_for_site(&settings.site_id, limit).await?;
            let out = output::render_list(
                &global.output,
                &events,
                |t| ThreatRow::from(t),
                |t| t.controller_event_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
