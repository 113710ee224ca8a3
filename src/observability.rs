//! Structured logging setup using `tracing-subscriber`.
//!
//! ## Log Format Options
//!
//! - `json` - Structured JSON, one event per line, for log aggregation
//! - `pretty` - Multi-line human-readable output with colors
//! - `compact` - Single-line terminal output with colors
//!
//! ## Environment Variables
//!
//! - `LOG_LEVEL`: ERROR, WARN, INFO, DEBUG or TRACE (defaults to INFO)
//! - `LOG_FORMAT`: json, pretty or compact (defaults to json)
//! - `RUST_LOG`: Overrides filtering entirely (env_logger syntax)
//!
//! ```bash
//! LOG_FORMAT=pretty LOG_LEVEL=DEBUG taxcalcd
//! ```

use std::env;

use tracing::Level;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Dependencies whose logs are capped at warn.
const QUIET_TARGETS: [&str; 4] = ["hyper=warn", "hyper_util=warn", "reqwest=warn", "tokio=warn"];

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format for structured logging.
    Json,
    /// Pretty format with colors and indentation.
    Pretty,
    /// Compact format with colors but minimal spacing.
    Compact,
}

impl LogFormat {
    /// Parses a format name; anything unrecognized is JSON.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

/// Parses a level name; anything unrecognized is INFO.
pub fn parse_level(s: &str) -> Level {
    match s.to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Raises `base` by one level per `-v` occurrence, capped at TRACE.
///
/// ```
/// use tracing::Level;
/// use taxcalc::observability::verbosity_level;
///
/// assert_eq!(verbosity_level(Level::WARN, 0), Level::WARN);
/// assert_eq!(verbosity_level(Level::WARN, 2), Level::DEBUG);
/// assert_eq!(verbosity_level(Level::INFO, 9), Level::TRACE);
/// ```
pub fn verbosity_level(base: Level, verbose: u8) -> Level {
    const ORDER: [Level; 5] = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];
    let start = ORDER.iter().position(|l| *l == base).unwrap_or(2);
    ORDER[(start + usize::from(verbose)).min(ORDER.len() - 1)]
}

fn build_filter(level: Level) -> EnvFilter {
    // Allow RUST_LOG to override
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    QUIET_TARGETS
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new(level.to_string()), EnvFilter::add_directive)
}

/// Installs the global subscriber.
///
/// Fails if a subscriber has already been installed.
pub fn init_logging(level: Level, format: LogFormat) -> Result<(), TryInitError> {
    let subscriber = tracing_subscriber::registry().with(build_filter(level));

    match format {
        LogFormat::Json => subscriber.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => subscriber
            .with(fmt::layer().pretty().with_ansi(true))
            .try_init(),
        LogFormat::Compact => subscriber
            .with(fmt::layer().compact().with_ansi(true).with_target(false))
            .try_init(),
    }
}

/// Installs the global subscriber configured from `LOG_LEVEL` and `LOG_FORMAT`.
pub fn init_default_logging() -> Result<(), TryInitError> {
    let level = parse_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()));
    let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()));
    init_logging(level, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
    }

    #[test]
    fn test_parse_level_defaults_to_info() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_verbosity_level_steps_up() {
        assert_eq!(verbosity_level(Level::INFO, 0), Level::INFO);
        assert_eq!(verbosity_level(Level::INFO, 1), Level::DEBUG);
        assert_eq!(verbosity_level(Level::ERROR, 255), Level::TRACE);
    }

    #[test]
    fn test_quiet_targets_are_valid_directives() {
        for directive in QUIET_TARGETS {
            assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok());
        }
    }
}
