use std::env;

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt subscriber, chosen by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else falls back to text.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Builds the filter from a `RUST_LOG` value, defaulting to `info`.
pub fn env_filter(value: Option<&str>) -> Result<EnvFilter, anyhow::Error> {
    let directives = value.filter(|value| !value.trim().is_empty());
    Ok(EnvFilter::try_new(directives.unwrap_or(DEFAULT_FILTER))?)
}

/// Installs the global fmt subscriber from `RUST_LOG` and `LOG_FORMAT`.
///
/// Safe to call more than once; later calls only log a warning.
pub fn configure_logging() -> Result<(), anyhow::Error> {
    let filter = env_filter(env::var("RUST_LOG").ok().as_deref())?;
    let format = LogFormat::from_env_value(env::var("LOG_FORMAT").ok().as_deref());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stdout);

    let installed = match format {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Text => subscriber.try_init(),
    };

    if let Err(e) = installed {
        warn!("Logging already initialized, keeping the existing subscriber: {e}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Text);
    }

    #[test]
    fn test_env_filter_defaults_to_info() {
        assert_eq!(
            env_filter(None).unwrap().max_level_hint(),
            Some(LevelFilter::INFO)
        );
        assert_eq!(
            env_filter(Some("  ")).unwrap().max_level_hint(),
            Some(LevelFilter::INFO)
        );
        assert_eq!(
            env_filter(Some("venue=trace")).unwrap().max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_configure_logging_is_idempotent() {
        configure_logging().unwrap();
        configure_logging().unwrap();
    }
}
