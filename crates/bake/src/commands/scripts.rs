//! Runtime config and copy text commands.

use std::path::Path;

use anyhow::Result;

use crate::config::load_config;

/// Render the runtime config to app_config.js.
pub fn app_config_js(config_path: &Path) -> Result<()> {
    let pipeline = load_config(config_path)?.pipeline()?;
    let written = pipeline.render_app_config()?;

    tracing::info!("Output: {}", written.display());

    Ok(())
}

/// Render copy text to copy.js.
pub fn copytext_js(config_path: &Path) -> Result<()> {
    let pipeline = load_config(config_path)?.pipeline()?;
    let written = pipeline.render_copytext()?;

    tracing::info!("Output: {}", written.display());

    Ok(())
}
