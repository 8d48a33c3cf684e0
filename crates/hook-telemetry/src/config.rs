//! Telemetry configuration from environment variables.

use std::env;

const DEFAULT_SERVICE_NAME: &str = "eventhook";

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name for logs
    pub service_name: String,

    /// Component identifier (publisher, registry, subscriber); empty for none
    pub component: String,

    /// Log level filter (trace, debug, info, warn, error) or an `EnvFilter` directive
    pub log_level: String,

    /// Whether to write log lines to stdout
    pub console_output: bool,

    /// Whether to format log lines as JSON
    pub json_logs: bool,

    /// Network identifier (devnet, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            component: String::new(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

fn flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1"
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EH_SERVICE_NAME`: Service name (default: eventhook)
    /// - `EH_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `EH_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `EH_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `EH_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("EH_SERVICE_NAME")
                .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string()),

            component: String::new(),

            log_level: env::var("EH_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("EH_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("EH_JSON_LOGS")
                .map(|v| flag(&v))
                .unwrap_or(is_container),

            network: env::var("EH_NETWORK").unwrap_or_else(|_| "devnet".to_string()),
        }
    }

    /// Create configuration for a specific component.
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.component = component.to_string();
        config
    }

    /// Service name including the component, if any.
    pub fn full_service_name(&self) -> String {
        if self.component.is_empty() {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.component)
        }
    }
}
