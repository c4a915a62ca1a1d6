//! Status command handler.
//!
//! Shows seed, init directory and compose file state without changing anything.

use clap::Args;
use seedbed_core::{config::AppConfig, AppResult};
use seedbed_provision::inspect;

/// Show provisioning status
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing status command");
        tracing::debug!("Status options: {:?}", self);

        let status = inspect(config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        let seed = match status.seed_bytes {
            Some(bytes) => format!("{} bytes", bytes),
            None => "missing".to_string(),
        };
        println!("Seed:          {} ({})", status.seed_path.display(), seed);
        println!("Source:        {}", status.seed_url);
        println!(
            "Compose file:  {} ({})",
            status.compose_file.display(),
            if status.compose_file_present {
                "present"
            } else {
                "missing"
            }
        );
        println!("Database:      {}", status.database_url);
        println!("Init scripts in {}:", status.init_dir.display());
        if status.init_scripts.is_empty() {
            println!("  (none)");
        }
        for script in &status.init_scripts {
            println!("  {} ({} bytes)", script.name, script.size_bytes);
        }

        Ok(())
    }
}
