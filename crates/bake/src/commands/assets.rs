//! Stylesheet and client template commands.

use std::path::Path;

use anyhow::Result;

use crate::config::load_config;

/// Render LESS files to CSS.
pub async fn less(config_path: &Path) -> Result<()> {
    let pipeline = load_config(config_path)?.pipeline()?;

    let compiled = pipeline.compile_stylesheets().await?;
    tracing::info!("Compiled {} stylesheets", compiled);

    Ok(())
}

/// Render client-side templates to a JST package.
pub async fn jst(config_path: &Path) -> Result<()> {
    let pipeline = load_config(config_path)?.pipeline()?;

    if pipeline.bundle_templates().await? {
        tracing::info!("Bundled templates from {}", pipeline.config().jst_dir.display());
    }

    Ok(())
}
