use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for the coordinator binary.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub json_format: bool,
    pub show_targets: bool,
    pub show_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            json_format: false,
            show_targets: true,
            show_thread_ids: false,
        }
    }
}

impl LogConfig {
    /// Development configuration (verbose, human-readable).
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// `LOG_JSON=true` switches to structured JSON output.
    pub fn from_env() -> Self {
        let json_format = std::env::var("LOG_JSON")
            .map(|value| value == "true" || value == "1")
            .unwrap_or(false);
        Self {
            json_format,
            ..Default::default()
        }
    }

    pub fn init(self) -> Result<(), String> {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "pairmatch_server={level},pairmatch_core={level}",
                level = self.default_level
            ))
        });

        if self.json_format {
            let fmt_layer = fmt::layer()
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {e}"))
        } else {
            let fmt_layer = fmt::layer()
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {e}"))
        }
    }
}
