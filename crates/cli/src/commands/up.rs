//! Up command handler.
//!
//! Downloads the seed if it is missing, then requests the service start.
//! This is also what runs when `seedbed` is invoked without a subcommand.

use clap::Args;
use seedbed_core::{config::AppConfig, AppResult};
use seedbed_provision::{create_provisioner, ProvisionReport, SeedOutcome};

/// Ensure the seed file exists, then start the database service
#[derive(Args, Debug, Default)]
pub struct UpCommand {
    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing up command");
        tracing::debug!("Up options: {:?}", self);

        let provisioner = create_provisioner(config)?;
        let report = provisioner.run().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

fn print_report(report: &ProvisionReport) {
    match &report.seed {
        SeedOutcome::AlreadyPresent { bytes } => {
            println!("Seed present:  {} ({} bytes)", report.seed_path.display(), bytes)
        }
        SeedOutcome::Downloaded { bytes, sha256 } => println!(
            "Seed fetched:  {} ({} bytes, sha256 {})",
            report.seed_path.display(),
            bytes,
            sha256
        ),
    }
    println!("Compose file:  {}", report.compose_file.display());
    println!("Service:       {}", report.state);
}
