//! Init command handler.
//!
//! Writes a compose file for the configured database.

use clap::Args;
use seedbed_core::{config::AppConfig, AppResult};
use seedbed_provision::{render_compose, scaffold_compose, ScaffoldOutcome};

/// Generate a docker-compose.yml for the seeded database
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Overwrite an existing compose file
    #[arg(long)]
    pub force: bool,

    /// Print the rendered file instead of writing it
    #[arg(long)]
    pub print: bool,
}

impl InitCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing init command");
        tracing::debug!("Init options: {:?}", self);

        if self.print {
            print!("{}", render_compose(config)?);
            return Ok(());
        }

        let path = config.compose_file_path();
        match scaffold_compose(config, self.force)? {
            ScaffoldOutcome::Written => println!("Wrote {}", path.display()),
            ScaffoldOutcome::Overwritten => println!("Overwrote {}", path.display()),
            ScaffoldOutcome::SkippedExisting => println!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ),
        }

        Ok(())
    }
}
