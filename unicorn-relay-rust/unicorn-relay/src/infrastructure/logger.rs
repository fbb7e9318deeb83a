use std::fs;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};
use crate::infrastructure::config::RelayConfig;

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_directory: String,
    pub enable_colors: bool,
    pub enable_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_console: true,
            enable_file: false,
            log_directory: "logs".to_string(),
            enable_colors: true,
            enable_thread_ids: false,
        }
    }
}

impl From<&RelayConfig> for LogConfig {
    fn from(config: &RelayConfig) -> Self {
        Self {
            level: config.log_level.clone(),
            enable_file: config.enable_file_logs,
            log_directory: config.log_dir.clone(),
            enable_colors: !config.is_production(),
            ..Default::default()
        }
    }
}

impl LogConfig {
    /// `RUST_LOG` wins; otherwise the configured level for our crates
    pub fn filter_directives(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!(
                "unicorn_relay={level},unicorn_bridge_core={level},actix_web=info",
                level = self.level
            )
        })
    }
}

pub struct Logger;

impl Logger {
    /// Install the global subscriber. Keep the returned guard alive for as
    /// long as file output should be flushed.
    pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
        let mut guard = None;
        INIT.call_once(|| {
            let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

            if config.enable_console {
                let console_layer = fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_thread_ids(config.enable_thread_ids)
                    .with_ansi(config.enable_colors)
                    .with_writer(std::io::stdout);
                layers.push(Box::new(console_layer));
            }

            if config.enable_file {
                if let Err(e) = fs::create_dir_all(&config.log_directory) {
                    eprintln!("Failed to create log directory: {e}");
                } else {
                    let file_appender = rolling::daily(&config.log_directory, "unicorn_relay.log");
                    let (writer, file_guard) = non_blocking(file_appender);
                    let file_layer = fmt::layer()
                        .with_timer(UtcTime::rfc_3339())
                        .with_thread_ids(config.enable_thread_ids)
                        .with_ansi(false)
                        .with_writer(writer);
                    layers.push(Box::new(file_layer));
                    guard = Some(file_guard);
                }
            }

            let result = Registry::default()
                .with(layers)
                .with(EnvFilter::new(config.filter_directives()))
                .try_init();
            if let Err(e) = result {
                eprintln!("Logger already installed: {e}");
            }
        });
        guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_from_relay_config() {
        let relay = RelayConfig {
            environment: "production".to_string(),
            log_level: "debug".to_string(),
            enable_file_logs: true,
            ..Default::default()
        };
        let config = LogConfig::from(&relay);
        assert_eq!(config.level, "debug");
        assert!(config.enable_file);
        assert!(!config.enable_colors);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig {
            enable_console: false,
            ..Default::default()
        };
        assert!(Logger::init(&config).is_none());
        assert!(Logger::init(&config).is_none());
    }
}
