//! Log output for the console. Everything goes to stderr so the menu on
//! stdout stays readable.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Overrides `APP_LOG_LEVEL` when set to something non-blank.
pub const FILTER_OVERRIDE_VAR: &str = "RUST_LOG";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{directives}' is not valid: {source}")]
    Filter {
        directives: String,
        source: ParseError,
    },
    #[error("a global log subscriber is already installed")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter text in effect: the override when present, else the configured
/// level.
pub fn effective_directives(config: &TelemetryConfig, override_value: Option<String>) -> String {
    override_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.log_level.clone())
}

pub fn build_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::Filter {
        directives: directives.to_string(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let directives = effective_directives(config, std::env::var(FILTER_OVERRIDE_VAR).ok());
    let filter = build_filter(&directives)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn override_wins_unless_blank() {
        let config = config("warn");
        assert_eq!(effective_directives(&config, None), "warn");
        assert_eq!(
            effective_directives(&config, Some("house_rental=debug".to_string())),
            "house_rental=debug"
        );
        assert_eq!(effective_directives(&config, Some("  ".to_string())), "warn");
    }

    #[test]
    fn configured_levels_build_filters() {
        assert!(build_filter("warn").is_ok());
        assert!(build_filter("house_rental=debug,info").is_ok());
    }

    #[test]
    fn rejects_unparseable_filter() {
        match build_filter("house_rental=verbose") {
            Err(TelemetryError::Filter { directives, .. }) => {
                assert_eq!(directives, "house_rental=verbose")
            }
            other => panic!("expected filter error, got {other:?}"),
        }
    }
}
