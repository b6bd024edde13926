//! Logger initialization.
//!
//! Everything in this crate logs through the `log` facade. This module wires
//! up a backend: `env_logger` on native targets and `console_log` in the
//! browser.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "flow_gl=debug"). When it is `None`, `RUST_LOG` is used, then `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut builder = env_logger::Builder::new();
            if let Some(filter) = config.env_filter.as_deref() {
                builder.parse_filters(filter);
            } else if let Ok(filter) = std::env::var("RUST_LOG") {
                builder.parse_filters(&filter);
            } else {
                builder.filter_level(log::LevelFilter::Info);
            }
            builder.write_style(config.write_style);
            if let Err(e) = builder.try_init() {
                println!("Warning: Could not initialize logger: {}", e);
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let level = config
                .env_filter
                .as_deref()
                .and_then(|filter| filter.parse::<log::Level>().ok())
                .unwrap_or(log::Level::Info);
            // Fails only when another logger is already installed.
            let _ = console_log::init_with_level(level);
        }

        log::debug!("logging initialized");
    });
}
