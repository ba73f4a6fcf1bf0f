//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use roamwatch_config::ConfigError;
use roamwatch_core::CoreError;

/// Exit codes for scripting against the CLI.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Controller ───────────────────────────────────────────────────
    #[error("Could not reach the controller")]
    #[diagnostic(
        code(roamwatch::controller),
        help(
            "Check controller_url and credentials, then verify with:\n\
             roamwatch test-connection"
        )
    )]
    Controller {
        #[source]
        source: roamwatch_api::Error,
    },

    #[error("Authentication with the controller failed")]
    #[diagnostic(
        code(roamwatch::auth),
        help(
            "Verify your API key or username/password.\n\
             API keys are created at Settings > Control Plane > Integrations."
        )
    )]
    Auth {
        #[source]
        source: roamwatch_api::Error,
    },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Database error")]
    #[diagnostic(
        code(roamwatch::storage),
        help("Check that database_path is writable and not corrupted.")
    )]
    Storage {
        #[source]
        source: CoreError,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(roamwatch::not_found),
        help("Run: roamwatch {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(roamwatch::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(roamwatch::validation))]
    Validation { field: String, reason: String },

    #[error("No controller credentials configured")]
    #[diagnostic(
        code(roamwatch::no_credentials),
        help(
            "Set ROAMWATCH_API_KEY, or ROAMWATCH_USERNAME and ROAMWATCH_PASSWORD,\n\
             or add them to the config file."
        )
    )]
    NoCredentials,

    #[error("Configuration could not be loaded")]
    #[diagnostic(code(roamwatch::config))]
    Config {
        #[source]
        source: ConfigError,
    },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Controller { .. } => exit_code::CONNECTION,
            Self::Auth { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TransientFetch { source } => {
                if source.is_auth_expired() {
                    Self::Auth { source }
                } else {
                    Self::Controller { source }
                }
            }

            CoreError::Storage { .. } | CoreError::Migration(_) => Self::Storage { source: err },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::DeviceExists { mac, .. } => Self::Conflict {
                resource_type: "device".into(),
                identifier: mac,
            },

            CoreError::DeviceNotFound { identifier } => Self::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::WebhookNotFound { id } => Self::NotFound {
                resource_type: "webhook".into(),
                identifier: id.to_string(),
                list_command: "webhooks list".into(),
            },

            CoreError::WebhookDelivery { name, message } => Self::Validation {
                field: format!("webhook '{name}'"),
                reason: message,
            },
        }
    }
}

impl From<roamwatch_api::Error> for CliError {
    fn from(err: roamwatch_api::Error) -> Self {
        if err.is_auth_expired() || matches!(err, roamwatch_api::Error::InvalidApiKey) {
            Self::Auth { source: err }
        } else {
            Self::Controller { source: err }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials => Self::NoCredentials,
            other => Self::Config { source: other },
        }
    }
}
