//! Logging setup for lambda-sql.
//!
//! The crate emits `tracing` events while it builds and renders filters
//! (`debug!` for context and configuration, `trace!` for tokens and SQL).
//! Nothing is printed unless a subscriber is installed, either by the
//! application or through [`init`].
//!
//! # Environment Variables
//!
//! - `LAMBDA_SQL_DEBUG=true|1|yes` - Enable debug logging
//! - `LAMBDA_SQL_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `LAMBDA_SQL_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use lambda_sql_query::logging;
//!
//! // Call once at startup.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Enables debug logging.
pub const DEBUG_VAR: &str = "LAMBDA_SQL_DEBUG";
/// Overrides the log level.
pub const LOG_LEVEL_VAR: &str = "LAMBDA_SQL_LOG_LEVEL";
/// Selects the output format.
pub const LOG_FORMAT_VAR: &str = "LAMBDA_SQL_LOG_FORMAT";

/// Check if debug logging is enabled via `LAMBDA_SQL_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_level(value: Option<&str>, debug: bool) -> &'static str {
    match value.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ if debug => "debug",
        _ => "warn",
    }
}

fn parse_format(value: Option<&str>) -> &'static str {
    match value.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// The configured log level.
///
/// Defaults to "debug" when `LAMBDA_SQL_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    parse_level(env::var(LOG_LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The configured log format, "json" unless overridden.
pub fn get_log_format() -> &'static str {
    parse_format(env::var(LOG_FORMAT_VAR).ok().as_deref())
}

/// Directive string for the crate targets at `level`.
pub fn filter_directive(level: &str) -> String {
    format!("lambda_sql={level},lambda_sql_query={level}")
}

/// Initialize logging from the environment.
///
/// Subsequent calls are no-ops. Without the `tracing-subscriber` feature
/// this only records that initialization happened; install your own
/// subscriber instead.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LOG_LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter =
                EnvFilter::try_new(filter_directive(level)).unwrap_or_else(|_| EnvFilter::new("warn"));

            let result = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if result.is_ok() {
                tracing::info!(level = level, format = get_log_format(), "lambda-sql logging initialized");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level(None, false), "warn");
        assert_eq!(parse_level(None, true), "debug");
        assert_eq!(parse_level(Some("TRACE"), false), "trace");
        assert_eq!(parse_level(Some("bogus"), false), "warn");
        assert_eq!(parse_level(Some("bogus"), true), "debug");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(parse_format(None), "json");
        assert_eq!(parse_format(Some("Pretty")), "pretty");
        assert_eq!(parse_format(Some("compact")), "compact");
        assert_eq!(parse_format(Some("xml")), "json");
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "lambda_sql=debug,lambda_sql_query=debug");
    }
}
