//! Full build command.

use std::path::Path;

use anyhow::Result;

use crate::config::load_config;

/// Compile assets and render every route.
pub async fn run(config_path: &Path) -> Result<()> {
    tracing::info!("Rendering static site...");

    let pipeline = load_config(config_path)?.pipeline()?;
    let result = pipeline.build().await?;

    tracing::info!(
        "Rendered {} pages ({} skipped) and {} stylesheets in {}ms",
        result.pages,
        result.skipped,
        result.stylesheets,
        result.duration_ms
    );

    if !result.templates_bundled {
        tracing::warn!("Client templates were not bundled");
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
