use ferrous_doh_domain::{CliOverrides, Config};
use tracing::error;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;

    config.validate().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;

    Ok(config)
}
