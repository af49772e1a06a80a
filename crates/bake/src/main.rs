//! bake CLI - render a web application into flat files.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "bake")]
#[command(about = "Render a web application into flat files for static hosting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to bake.toml config file
    #[arg(short, long, default_value = "bake.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render LESS files to CSS
    Less,

    /// Render client-side templates to a JST package
    Jst,

    /// Render the runtime config to app_config.js
    AppConfigJs,

    /// Render copy text to copy.js
    CopytextJs,

    /// Compile assets and render every route (default)
    Render,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command.unwrap_or(Commands::Render) {
        Commands::Less => commands::assets::less(&cli.config).await?,
        Commands::Jst => commands::assets::jst(&cli.config).await?,
        Commands::AppConfigJs => commands::scripts::app_config_js(&cli.config)?,
        Commands::CopytextJs => commands::scripts::copytext_js(&cli.config)?,
        Commands::Render => commands::render::run(&cli.config).await?,
    }

    Ok(())
}
