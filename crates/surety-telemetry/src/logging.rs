//! Structured logging.
//!
//! JSON output carries consistent fields that log shippers can parse:
//! `timestamp`, `level`, `target`, `fields.component`, `fields.message` and
//! any event-specific context.

use crate::{TelemetryConfig, TelemetryError};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format chosen from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored.
    Pretty,
    /// One JSON object per line.
    Json,
    /// Filter installed, nothing written.
    Silent,
}

/// Build the env filter. `RUST_LOG` style directives are accepted.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format() {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(true),
            )
            .try_init(),
        LogFormat::Silent => registry.try_init(),
    };

    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a flight-related event with standard fields.
#[macro_export]
macro_rules! log_flight_event {
    ($level:ident, $component:expr, $msg:expr, $flight_key:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            flight = %$flight_key,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an account-related event with standard fields.
#[macro_export]
macro_rules! log_account_event {
    ($level:ident, $component:expr, $msg:expr, $account:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            account = %$account,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        let config = TelemetryConfig {
            log_level: "info,surety_ledger=debug".to_string(),
            ..TelemetryConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let config = TelemetryConfig {
            log_level: "surety_ledger=loudest".to_string(),
            ..TelemetryConfig::default()
        };
        let err = build_filter(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }

    #[test]
    fn test_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
    }

    #[test]
    fn test_log_macros_expand_without_subscriber() {
        crate::log_event!(info, "ledger", "plain message");
        crate::log_event!(debug, "ledger", "with fields", count = 3);
        crate::log_flight_event!(info, "oracles", "flight event", "0x01/ND1309/1");
        crate::log_account_event!(warn, "insurance", "account event", "0x02", amount = 5u64);
    }
}
