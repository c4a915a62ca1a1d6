//! Builds provisioning collaborators from application configuration.

use crate::backends::{ComposeLauncher, HttpSeedSource};
use crate::launcher::ServiceLauncher;
use crate::provisioner::Provisioner;
use crate::seed::SeedTarget;
use crate::source::SeedSource;
use seedbed_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;

/// Create the seed source for the configured URL.
///
/// # Errors
/// Returns a config error if the URL scheme is not http or https.
pub fn create_seed_source(config: &AppConfig) -> AppResult<Arc<dyn SeedSource>> {
    let url = config.seed.url.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(Arc::new(HttpSeedSource::new(&config.fetch)?))
    } else {
        Err(AppError::Config(format!("Unsupported seed URL: {}", url)))
    }
}

/// Create the orchestration launcher.
pub fn create_launcher(config: &AppConfig) -> AppResult<Arc<dyn ServiceLauncher>> {
    Ok(Arc::new(ComposeLauncher::from_config(
        &config.service,
        &config.workspace,
    )?))
}

/// Validate the configuration and wire a [`Provisioner`] from it.
pub fn create_provisioner(config: &AppConfig) -> AppResult<Provisioner> {
    config.validate()?;

    Ok(Provisioner::new(
        SeedTarget::from_config(config),
        config.compose_file_path(),
        create_seed_source(config)?,
        create_launcher(config)?,
    ))
}
