//! Tracing setup for the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Pick the filter directive: `-v` flags win over the config file, and the
/// default is `warn`.
pub fn filter_directive(verbosity: u8, config: &Config) -> String {
    let from_flags = match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    from_flags
        .map(str::to_string)
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "warn".to_string())
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the computed directive. Set `LOG_FORMAT=json` for
/// structured output.
pub fn init_tracing(verbosity: u8, config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(verbosity, config)))?;

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_warn() {
        assert_eq!(filter_directive(0, &Config::default()), "warn");
    }

    #[test]
    fn config_level_used_without_flags() {
        let config = Config {
            log_level: Some("fpsutil=debug".into()),
            ..Default::default()
        };
        assert_eq!(filter_directive(0, &config), "fpsutil=debug");
        assert_eq!(filter_directive(1, &config), "info");
        assert_eq!(filter_directive(5, &config), "trace");
    }
}
