//! Webhook target command handlers.

use tabled::Tabled;

use roamwatch_config::Settings;
use roamwatch_core::{TransitionKind, WebhookConfig};

use crate::cli::{GlobalOpts, WebhooksArgs, WebhooksCommand};
use crate::error::CliError;
use crate::output;

use super::open_store;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct WebhookRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Events")]
    events: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Last triggered")]
    last_triggered: String,
}

impl From<&WebhookConfig> for WebhookRow {
    fn from(h: &WebhookConfig) -> Self {
        let mut events = Vec::new();
        if h.on_connected {
            events.push("connected");
        }
        if h.on_disconnected {
            events.push("disconnected");
        }
        if h.on_roamed {
            events.push("roamed");
        }

        Self {
            id: h.id,
            name: h.name.clone(),
            provider: h.provider.to_string(),
            enabled: if h.enabled { "yes" } else { "no" }.into(),
            events: events.join(","),
            url: h.url.clone(),
            last_triggered: output::ago(h.last_triggered),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: WebhooksArgs,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    match args.command {
        WebhooksCommand::Add {
            name,
            url,
            provider,
            events,
        } => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Validation {
                    field: "url".into(),
                    reason: format!("'{url}' is not an http(s) URL"),
                });
            }

            // Absent --events means all kinds.
            let wants = |kind: TransitionKind| {
                events.as_ref().is_none_or(|list| list.contains(&kind))
            };

            let hook = store
                .add_webhook(
                    &name,
                    &url,
                    provider,
                    wants(TransitionKind::Connected),
                    wants(TransitionKind::Disconnected),
                    wants(TransitionKind::Roamed),
                )
                .await?;

            output::print_output(
                &format!("Webhook '{}' added with id {}", hook.name, hook.id),
                global.quiet,
            );
            Ok(())
        }

        WebhooksCommand::List => {
            let hooks = store.list_webhooks().await?;
            let out = output::render_list(
                &global.output,
                &hooks,
                |h| WebhookRow::from(h),
                |h| h.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WebhooksCommand::Remove { id } => {
            store.delete_webhook(id).await?;
            output::print_output(&format!("Webhook {id} removed"), global.quiet);
            Ok(())
        }

        WebhooksCommand::Enable { id } => {
            store.set_webhook_enabled(id, true).await?;
            output::print_output(&format!("Webhook {id} enabled"), global.quiet);
            Ok(())
        }

        WebhooksCommand::Disable { id } => {
            store.set_webhook_enabled(id, false).await?;
            output::print_output(&format!("Webhook {id} disabled"), global.quiet);
            Ok(())
        }
    }
}
