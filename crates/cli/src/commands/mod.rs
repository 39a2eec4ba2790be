pub mod config;
pub mod doctor;
pub mod drill;
pub mod export;
pub mod report;

use balview_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use balview_core::errors::ApplicationError;
use balview_core::filter::EntityFilter;
use balview_core::Dashboard;
use balview_gateway::build_gateway;
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 5);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Human-readable output for a successful command.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: impl Into<ApplicationError>) -> Self {
        let error = error.into();
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }
}

/// Toolbar filters shared by `report` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long, help = "Entity code, or ALL for every entity")]
    pub entity: Option<String>,
    #[arg(long, help = "Case-insensitive match on GL code or description")]
    pub search: Option<String>,
    #[arg(long, help = "Minimum |%Var| to include, 0-20")]
    pub threshold: Option<u8>,
}

impl FilterArgs {
    pub fn into_overrides(self) -> Result<ConfigOverrides, ApplicationError> {
        let entity = self.entity.map(|raw| raw.parse::<EntityFilter>()).transpose()?;
        Ok(ConfigOverrides {
            entity,
            search: self.search,
            threshold_pct: self.threshold,
            ..ConfigOverrides::default()
        })
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\
             \"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(
    command: &str,
    overrides: ConfigOverrides,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            5,
        )
    })
}

/// Builds the gateway from config and loads the variance rows into a fresh dashboard.
pub(crate) fn load_dashboard(
    command: &str,
    config: &AppConfig,
    runtime: &Runtime,
) -> Result<Dashboard, CommandResult> {
    let gateway = build_gateway(&config.gateway)
        .map_err(|error| CommandResult::from_error(command, error))?;
    let mut dashboard = Dashboard::new(&config.review, gateway);
    runtime
        .block_on(dashboard.load())
        .map_err(|error| CommandResult::from_error(command, error))?;
    Ok(dashboard)
}
