//! Value types produced by provisioning and inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What `ensure_seed_present` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// File was already at the path; no network request was made.
    AlreadyPresent { bytes: u64 },

    /// File was fetched and moved into place.
    Downloaded { bytes: u64, sha256: String },
}

impl SeedOutcome {
    pub fn bytes(&self) -> u64 {
        match self {
            SeedOutcome::AlreadyPresent { bytes } | SeedOutcome::Downloaded { bytes, .. } => {
                *bytes
            }
        }
    }

    pub fn was_downloaded(&self) -> bool {
        matches!(self, SeedOutcome::Downloaded { .. })
    }
}

/// Progress of a provisioning run.
///
/// `NotStarted -> SeedReady -> ServiceRequested`. The terminal state means
/// the start request was accepted, not that the database is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionState {
    NotStarted,
    SeedReady,
    ServiceRequested,
}

impl std::fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProvisionState::NotStarted => "not started",
            ProvisionState::SeedReady => "seed ready",
            ProvisionState::ServiceRequested => "service requested",
        };
        f.write_str(name)
    }
}

/// Summary of one successful provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub seed_path: PathBuf,
    pub seed: SeedOutcome,
    pub compose_file: PathBuf,
    pub launcher: String,
    pub state: ProvisionState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// A first-boot script found in the init directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitScript {
    pub name: String,
    pub size_bytes: u64,
}

/// Read-only snapshot of the environment, as shown by `seedbed status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentStatus {
    pub seed_path: PathBuf,
    pub seed_present: bool,
    pub seed_bytes: Option<u64>,
    pub seed_url: String,
    pub init_dir: PathBuf,
    pub init_scripts: Vec<InitScript>,
    pub compose_file: PathBuf,
    pub compose_file_present: bool,
    pub database_url: String,
}

/// Result of `scaffold_compose`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaffoldOutcome {
    Written,
    Overwritten,
    SkippedExisting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_outcome_serializes_tagged() {
        let outcome = SeedOutcome::Downloaded {
            bytes: 12,
            sha256: "ab".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "downloaded");
        assert_eq!(json["bytes"], 12);
        assert!(outcome.was_downloaded());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ProvisionState::ServiceRequested.to_string(), "service requested");
    }
}
