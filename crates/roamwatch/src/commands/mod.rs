//! Command handlers, one module per top-level subcommand group.

mod control;
mod devices;
mod serve;
mod threats;
mod webhooks;

use roamwatch_config::Settings;
use roamwatch_core::Store;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    cmd: Command,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Serve => serve::handle(settings).await,
        Command::Devices(args) => devices::handle(args, settings, global).await,
        Command::Webhooks(args) => webhooks::handle(args, settings, global).await,
        Command::Threats(args) => threats::handle(args, settings, global).await,
        Command::Status => control::status(settings, global).await,
        Command::TestConnection => control::test_connection(settings, global).await,
        Command::Refresh => control::refresh(settings, global).await,
        Command::Completions(_) => Ok(()), // handled in main before dispatch
    }
}

/// Open the store at the configured path, creating the data directory
/// on first run.
pub(crate) async fn open_store(settings: &Settings) -> Result<Store, CliError> {
    if let Some(parent) = settings.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(Store::open(&settings.database_path).await?)
}
