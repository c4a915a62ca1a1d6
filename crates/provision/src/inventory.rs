//! Read-only inspection of the provisioning environment.

use crate::types::{EnvironmentStatus, InitScript};
use seedbed_core::{AppConfig, AppResult};
use std::path::Path;

/// File suffixes the Postgres entrypoint executes from its init directory.
const INIT_SUFFIXES: [&str; 4] = [".sql", ".sql.gz", ".sql.xz", ".sh"];

/// List first-boot scripts in `init_dir`, sorted by file name.
///
/// Sorting matches the order the database entrypoint applies them. A missing
/// directory yields an empty list.
pub fn list_init_scripts(init_dir: &Path) -> AppResult<Vec<InitScript>> {
    if !init_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut scripts = Vec::new();

    for entry in walkdir::WalkDir::new(init_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !INIT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }

        let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        scripts.push(InitScript { name, size_bytes });
    }

    scripts.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(scripts)
}

/// Snapshot seed, init directory and compose file state without side effects.
pub fn inspect(config: &AppConfig) -> AppResult<EnvironmentStatus> {
    let seed_path = config.seed_path();
    let seed_bytes = std::fs::metadata(&seed_path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len());

    let init_dir = config.init_dir();
    let init_scripts = list_init_scripts(&init_dir)?;

    let compose_file = config.compose_file_path();
    let compose_file_present = compose_file.is_file();

    Ok(EnvironmentStatus {
        seed_present: seed_bytes.is_some(),
        seed_bytes,
        seed_path,
        seed_url: config.seed.url.clone(),
        init_dir,
        init_scripts,
        compose_file,
        compose_file_present,
        database_url: config.database.redacted_url(),
    })
}
