//! Build pipeline.
//!
//! Runs the build steps in order: stylesheets, client templates, runtime config,
//! copy text, then every renderable route of the application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use bake_app::{
    App, AppError, IncludeCache, APP_CONFIG_HANDLER, APP_CONFIG_PATH, COPY_HANDLER, COPY_PATH,
};

use crate::renderer::StaticRenderer;
use crate::routes::RouteEnumerator;
use crate::tools::{ExternalTool, ToolError};

/// Configuration for a build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory
    pub www_dir: PathBuf,

    /// Directory of `.less` sources
    pub less_dir: PathBuf,

    /// Directory of client-side templates
    pub jst_dir: PathBuf,

    /// LESS compiler
    pub lessc: ExternalTool,

    /// Client template bundler
    pub jst: ExternalTool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            www_dir: PathBuf::from("www"),
            less_dir: PathBuf::from("less"),
            jst_dir: PathBuf::from("jst"),
            lessc: ExternalTool::new("lessc", "node_modules/less/bin/lessc"),
            jst: ExternalTool::new("jst", "node_modules/universal-jst/bin/jst.js").tolerant(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of stylesheets compiled
    pub stylesheets: usize,

    /// Whether client templates were bundled
    pub templates_bundled: bool,

    /// Number of pages rendered
    pub pages: usize,

    /// Number of routes skipped for having no file form
    pub skipped: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Failed to read sources: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Sequences the build steps for one application.
pub struct Pipeline {
    config: BuildConfig,
    app: App,
}

impl Pipeline {
    pub fn new(config: BuildConfig, app: App) -> Self {
        Self { config, app }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run every step.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        let stylesheets = self.compile_stylesheets().await?;
        let templates_bundled = self.bundle_templates().await?;
        self.render_app_config()?;
        self.render_copytext()?;

        // One cache per run; compiled includes are shared by every page.
        let mut includes = IncludeCache::new();
        let (pages, skipped) = self.render_routes(&mut includes)?;

        Ok(BuildReport {
            stylesheets,
            templates_bundled,
            pages,
            skipped,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.www_dir.clone(),
        })
    }

    /// Compile each `.less` file to `<www>/css/<name>.less.css`.
    pub async fn compile_stylesheets(&self) -> Result<usize, BuildError> {
        let sources = discover_stylesheets(&self.config.less_dir)?;
        if sources.is_empty() {
            return Ok(0);
        }

        let css_dir = self.config.www_dir.join("css");
        fs::create_dir_all(&css_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", css_dir.display(), e)))?;

        let mut compiled = 0;
        for source in &sources {
            let (Some(src_arg), Some(stem)) =
                (source.to_str(), source.file_stem().and_then(|s| s.to_str()))
            else {
                return Err(BuildError::ReadError(format!(
                    "{}: file name is not valid UTF-8",
                    source.display()
                )));
            };
            let out = css_dir.join(format!("{}.less.css", stem));

            let out_arg = out.to_string_lossy();
            if self.run_tool(&self.config.lessc, &[src_arg, &*out_arg]).await? {
                tracing::info!("Compiled {}", out.display());
                compiled += 1;
            }
        }

        Ok(compiled)
    }

    /// Bundle client templates into `<www>/js/templates.js`.
    pub async fn bundle_templates(&self) -> Result<bool, BuildError> {
        let js_dir = self.config.www_dir.join("js");
        fs::create_dir_all(&js_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", js_dir.display(), e)))?;

        let jst_arg = self.config.jst_dir.to_string_lossy();
        let out_arg = js_dir.join("templates.js").to_string_lossy().into_owned();
        let args = ["--template", "underscore", &*jst_arg, out_arg.as_str()];

        self.run_tool(&self.config.jst, &args).await
    }

    /// Render the runtime config to `<www>/js/app_config.js`.
    pub fn render_app_config(&self) -> Result<PathBuf, BuildError> {
        let dest = self.config.www_dir.join("js").join("app_config.js");
        self.renderer().write_script(APP_CONFIG_HANDLER, APP_CONFIG_PATH, &dest)?;
        Ok(dest)
    }

    /// Render the copy text to `<www>/js/copy.js`.
    pub fn render_copytext(&self) -> Result<PathBuf, BuildError> {
        let dest = self.config.www_dir.join("js").join("copy.js");
        self.renderer().write_script(COPY_HANDLER, COPY_PATH, &dest)?;
        Ok(dest)
    }

    /// Render every enumerable route. Returns (pages written, routes skipped).
    pub fn render_routes(&self, includes: &mut IncludeCache) -> Result<(usize, usize), BuildError> {
        let renderer = self.renderer();
        let routes = RouteEnumerator::new(self.app.routes(), &self.app.settings().langs);

        let mut pages = 0;
        let mut skipped = 0;

        for target in routes.targets() {
            match renderer.render(&target.name, &target.path, includes)? {
                Some(_) => pages += 1,
                None => skipped += 1,
            }
        }

        Ok((pages, skipped))
    }

    fn renderer(&self) -> StaticRenderer<'_> {
        StaticRenderer::new(&self.app, &self.config.www_dir)
    }

    /// Run a tool under its failure policy.
    ///
    /// Returns whether it succeeded; failures of tolerant tools are logged and swallowed.
    async fn run_tool(&self, tool: &ExternalTool, args: &[&str]) -> Result<bool, BuildError> {
        let result = tool
            .run(args, |e| {
                if e.is_missing() || tool.fatal {
                    tracing::error!("{}", e);
                }
            })
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(e) if tool.fatal => Err(e.into()),
            Err(e) => {
                tracing::warn!("Continuing without {}: {}", tool.label, e);
                Ok(false)
            }
        }
    }
}

/// `.less` files directly inside `dir`, sorted by name.
fn discover_stylesheets(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.exists() {
        tracing::debug!("No stylesheet directory at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut sources = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("less") {
            sources.push(path.to_path_buf());
        }
    }

    Ok(sources)
}
