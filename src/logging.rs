use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber on stderr. `RUST_LOG` overrides the
/// configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|e| eyre!("invalid log level {level:?}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_directives() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("procscope=debug,warn").is_ok());
    }

    #[test]
    fn rejects_garbage_level() {
        assert!(EnvFilter::try_new("procscope=notalevel").is_err());
    }
}
