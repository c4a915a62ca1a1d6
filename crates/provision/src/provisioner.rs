//! Two-step provisioning run: seed, then start.

use crate::launcher::ServiceLauncher;
use crate::seed::{ensure_seed_present, SeedTarget};
use crate::source::SeedSource;
use crate::types::{ProvisionReport, ProvisionState};
use chrono::Utc;
use seedbed_core::AppResult;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs the seed step and the start step in program order.
///
/// The start request is only issued after the seed file is in place: the
/// database applies init scripts once, when its volume is first created, so
/// a container started without the seed stays empty.
pub struct Provisioner {
    target: SeedTarget,
    compose_file: PathBuf,
    source: Arc<dyn SeedSource>,
    launcher: Arc<dyn ServiceLauncher>,
}

impl Provisioner {
    pub fn new(
        target: SeedTarget,
        compose_file: impl Into<PathBuf>,
        source: Arc<dyn SeedSource>,
        launcher: Arc<dyn ServiceLauncher>,
    ) -> Self {
        Self {
            target,
            compose_file: compose_file.into(),
            source,
            launcher,
        }
    }

    pub fn target(&self) -> &SeedTarget {
        &self.target
    }

    /// Run both steps, failing fast on the first error.
    ///
    /// If seeding fails the launcher is never called. Nothing is retried.
    pub async fn run(&self) -> AppResult<ProvisionReport> {
        let started_at = Utc::now();
        let mut state = ProvisionState::NotStarted;
        tracing::debug!("Provisioning state: {}", state);

        let seed = ensure_seed_present(&self.target, self.source.as_ref())
            .await
            .inspect_err(|e| tracing::error!("Seeding failed ({}): {}", state, e))?;
        state = ProvisionState::SeedReady;
        tracing::debug!("Provisioning state: {}", state);

        self.launcher
            .start()
            .await
            .inspect_err(|e| tracing::error!("Service start failed ({}): {}", state, e))?;
        state = ProvisionState::ServiceRequested;
        tracing::info!("Provisioning finished: {}", state);

        Ok(ProvisionReport {
            seed_path: self.target.path.clone(),
            seed,
            compose_file: self.compose_file.clone(),
            launcher: self.launcher.launcher_name().to_string(),
            state,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
