//! Structured logging via the `tracing` ecosystem.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DebugConfig;

/// Filter used when neither `RUST_LOG` nor the config asks for anything else.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence, then `debug.log_level`, then
/// [`DEFAULT_FILTER`]. Calling this more than once is harmless; later calls
/// leave the first subscriber in place.
///
/// # Examples
///
/// ```no_run
/// use jovian::{DebugConfig, init_logging};
///
/// init_logging(&DebugConfig::default());
/// ```
pub fn init_logging(debug: &DebugConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config_env_filter(debug));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

/// The filter requested by the config, or the default one.
pub fn config_env_filter(debug: &DebugConfig) -> EnvFilter {
    let directives = if debug.log_level.trim().is_empty() {
        DEFAULT_FILTER
    } else {
        debug.log_level.as_str()
    };
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = config_env_filter(&DebugConfig::default()).to_string();
        assert!(filter.contains("wgpu=warn"));
        assert!(filter.contains("naga=warn"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_config_override() {
        let debug = DebugConfig {
            log_level: "jovian=trace".to_string(),
            ..Default::default()
        };
        let filter = config_env_filter(&debug).to_string();
        assert!(filter.contains("jovian=trace"));
        assert!(!filter.contains("wgpu=warn"));
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let debug = DebugConfig {
            log_level: "jovian=notalevel".to_string(),
            ..Default::default()
        };
        let filter = config_env_filter(&debug).to_string();
        assert!(filter.contains("wgpu=warn"));
    }

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_logging(&DebugConfig::default());
        init_logging(&DebugConfig::default());
    }
}
