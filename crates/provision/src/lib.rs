//! Environment provisioning for seedbed.
//!
//! A run has two strictly ordered steps:
//! 1. Make sure the seed SQL file exists in the init directory, downloading
//!    it once if it is missing.
//! 2. Ask the orchestration layer to bring the database service up.
//!
//! The init directory is mounted by the database container and its scripts
//! are applied only when the data volume is first created, so step 1 must
//! finish before step 2 is issued.
//!
//! Both external collaborators sit behind traits ([`SeedSource`],
//! [`ServiceLauncher`]) so the sequencing can be exercised without network
//! or container runtime.
//!
//! # Example
//! ```no_run
//! use seedbed_core::AppConfig;
//! use seedbed_provision::create_provisioner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None, None)?;
//! let report = create_provisioner(&config)?.run().await?;
//! println!("{:?}", report.state);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod factory;
pub mod inventory;
pub mod launcher;
pub mod provisioner;
pub mod scaffold;
pub mod seed;
pub mod source;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types
pub use backends::{ComposeLauncher, HttpSeedSource};
pub use factory::{create_launcher, create_provisioner, create_seed_source};
pub use inventory::{inspect, list_init_scripts};
pub use launcher::ServiceLauncher;
pub use provisioner::Provisioner;
pub use scaffold::{render_compose, scaffold_compose};
pub use seed::{ensure_seed_present, SeedTarget};
pub use source::SeedSource;
pub use types::{
    EnvironmentStatus, InitScript, ProvisionReport, ProvisionState, ScaffoldOutcome, SeedOutcome,
};
