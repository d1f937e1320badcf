//! Logging setup.
//!
//! The library itself only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`init`] once at startup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::config::GeneralConfig;
use crate::{PolyCacheError, PolyCacheResult};

/// Installs a global subscriber writing to stderr.
///
/// `RUST_LOG` directives are honored; `config.log_level` sets the level for
/// this crate. `config.log_format` selects `text` or `json` output.
pub fn init(config: &GeneralConfig) -> PolyCacheResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(directive(&config.log_level)?);

    let result = match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
        "text" => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
        other => {
            return Err(PolyCacheError::config(format!(
                "Unknown log format '{other}' (expected text or json)"
            )))
        }
    };

    result.map_err(|e| PolyCacheError::Logging(e.to_string()))
}

fn directive(level: &str) -> PolyCacheResult<tracing_subscriber::filter::Directive> {
    format!("polycache={level}")
        .parse()
        .map_err(|_| PolyCacheError::config(format!("Invalid log level '{level}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_parsing() {
        assert!(directive("debug").is_ok());
        assert!(directive("verbose").is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let config = GeneralConfig {
            log_level: "info".to_string(),
            log_format: "xml".to_string(),
        };
        assert!(matches!(init(&config), Err(PolyCacheError::Config(_))));
    }
}
