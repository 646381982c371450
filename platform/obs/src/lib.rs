use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "info";

/// Output shape of the fmt layer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub format: LogFormat,
    pub with_target: bool,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "pipeline-cli",
            env_filter: None,
            format: LogFormat::Full,
            with_target: false,
        }
    }
}

impl ObsConfig {
    /// Filter directive actually applied: explicit config, then `RUST_LOG`, then the default.
    pub fn resolved_filter(&self) -> String {
        self.env_filter
            .clone()
            .filter(|f| !f.trim().is_empty())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

/// Install the global tracing subscriber. Calling it again is a no-op.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(config.resolved_filter())?;
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Full => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(config.with_target)
                .with_writer(std::io::stderr);
            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(config.with_target)
                .with_writer(std::io::stderr);
            registry.with(fmt_layer).try_init()?;
        }
    }

    INIT.set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    tracing::debug!(service = config.service_name, "tracing initialized");
    Ok(())
}
