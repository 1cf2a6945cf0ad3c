use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Diagnostics go to stderr so
/// stdout stays clean for command output.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("install tracing subscriber")
}
