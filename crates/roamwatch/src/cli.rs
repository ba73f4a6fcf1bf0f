//! Clap derive structures for the `roamwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use roamwatch_core::{TransitionKind, WebhookProvider};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// roamwatch -- device-presence tracking for UniFi networks
#[derive(Debug, Parser)]
#[command(
    name = "roamwatch",
    version,
    about = "Track named client devices across a UniFi network",
    long_about = "Polls a UniFi controller to track where your devices are: \n\
        which access point they're on, when they roam, when they come and go.\n\
        Transitions are logged to a local database and fanned out to webhooks.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, short = 'c', env = "ROAMWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Site to operate on (overrides config)
    #[arg(long, short = 's', global = true)]
    pub site: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the tracking daemon (reconciliation loop + notifier)
    Serve,

    /// Manage tracked devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage outbound webhooks
    #[command(alias = "wh")]
    Webhooks(WebhooksArgs),

    /// View intrusion-detection events
    Threats(ThreatsArgs),

    /// Show store summary for the site
    Status,

    /// Verify controller connectivity and credentials
    TestConnection,

    /// Run one reconciliation tick immediately
    Refresh,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Start tracking a device by hardware address
    Add {
        /// Hardware address (any common format)
        mac: String,

        /// Display name
        #[arg(long, short = 'n')]
        name: Option<String>,
    },

    /// List tracked devices
    #[command(alias = "ls")]
    List,

    /// Stop tracking a device (removes its history)
    #[command(alias = "rm")]
    Remove {
        /// Device id or hardware address
        device: String,
    },

    /// Rename a tracked device
    Rename {
        /// Device id or hardware address
        device: String,

        /// New display name
        name: String,
    },

    /// Show a device's connection history
    History {
        /// Device id or hardware address
        device: String,

        /// Maximum entries to show
        #[arg(long, default_value_t = 50)]
        limit: i64,

        /// Entries to skip
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

// ── Webhooks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WebhooksArgs {
    #[command(subcommand)]
    pub command: WebhooksCommand,
}

#[derive(Debug, Subcommand)]
pub enum WebhooksCommand {
    /// Add a webhook target
    Add {
        /// Short name for the target
        name: String,

        /// Endpoint URL
        url: String,

        /// Payload shape: generic, discord, or slack
        #[arg(long, default_value = "generic")]
        provider: WebhookProvider,

        /// Event kinds to deliver (default: all)
        #[arg(long, value_delimiter = ',')]
        events: Option<Vec<TransitionKind>>,
    },

    /// List webhook targets
    #[command(alias = "ls")]
    List,

    /// Delete a webhook target
    #[command(alias = "rm")]
    Remove {
        /// Webhook id
        id: i64,
    },

    /// Enable a webhook target
    Enable {
        /// Webhook id
        id: i64,
    },

    /// Disable a webhook target without deleting it
    Disable {
        /// Webhook id
        id: i64,
    },
}

// ── Threats ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ThreatsArgs {
    #[command(subcommand)]
    pub command: ThreatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThreatsCommand {
    /// List recent intrusion-detection events
    #[command(alias = "ls")]
    List {
        /// Maximum events to show
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
