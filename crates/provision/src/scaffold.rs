//! Compose file scaffolding.
//!
//! Renders a single-service Postgres compose file whose init directory is the
//! directory holding the seed artifact.

use crate::types::ScaffoldOutcome;
use handlebars::Handlebars;
use seedbed_core::{AppConfig, AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

const COMPOSE_TEMPLATE: &str = include_str!("../templates/docker-compose.yml.hbs");

/// Render the compose file for `config` without touching the filesystem.
pub fn render_compose(config: &AppConfig) -> AppResult<String> {
    let db = &config.database;

    let mut variables = HashMap::new();
    variables.insert("image", db.image.clone());
    variables.insert("containerName", db.container_name.clone());
    variables.insert("dbName", db.name.clone());
    variables.insert("dbUser", db.user.clone());
    variables.insert("dbPassword", db.password.clone());
    variables.insert("port", db.port.to_string());
    variables.insert("initDir", mount_source(config));

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("compose", COMPOSE_TEMPLATE)
        .map_err(|e| AppError::Template(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("compose", &variables)
        .map_err(|e| AppError::Template(format!("Failed to render compose file: {}", e)))
}

/// Write the compose file unless one exists (or `force` is set).
pub fn scaffold_compose(config: &AppConfig, force: bool) -> AppResult<ScaffoldOutcome> {
    let path = config.compose_file_path();
    let existed = path.exists();

    if existed && !force {
        tracing::info!("Compose file {:?} already exists, leaving it alone", path);
        return Ok(ScaffoldOutcome::SkippedExisting);
    }

    let rendered = render_compose(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(config.init_dir())?;
    std::fs::write(&path, rendered)?;

    tracing::info!("Wrote compose file {:?}", path);

    Ok(if existed {
        ScaffoldOutcome::Overwritten
    } else {
        ScaffoldOutcome::Written
    })
}

/// Host side of the init-directory bind mount.
///
/// Compose resolves relative paths against the compose file's directory, so
/// the init directory is expressed relative to it when it lives underneath,
/// and as an absolute path otherwise.
fn mount_source(config: &AppConfig) -> String {
    let compose_path = config.compose_file_path();
    let compose_dir = compose_path.parent().unwrap_or_else(|| Path::new(""));
    let init_dir = config.init_dir();

    match init_dir.strip_prefix(compose_dir) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => format!("./{}", rel.display()),
        Err(_) => init_dir.display().to_string(),
    }
}
