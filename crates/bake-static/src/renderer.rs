//! Render application routes to files.

use std::fs;
use std::path::{Path, PathBuf};

use bake_app::{path_args, App, IncludeCache};

use crate::pipeline::BuildError;

/// One route rendered to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Handler name
    pub name: String,

    /// Request path
    pub path: String,

    /// File the response is written to
    pub output: PathBuf,

    /// Non-empty path segments passed to the handler
    pub args: Vec<String>,
}

impl RenderJob {
    /// Plan a render of `path`, or `None` when the path has no file form.
    pub fn plan(name: &str, path: &str, root: &Path) -> Option<Self> {
        let output = output_path(root, path)?;

        Some(Self {
            name: name.to_string(),
            path: path.to_string(),
            output,
            args: path_args(path),
        })
    }
}

/// Map a request path to the file serving it.
///
/// `/guide/` becomes `<root>/guide/index.html`, `/about.html` becomes
/// `<root>/about.html`. Anything else has no static form, nor does a path that
/// would climb out of `root` through `..` segments.
pub fn output_path(root: &Path, path: &str) -> Option<PathBuf> {
    if path.split('/').any(|segment| segment == "..") {
        tracing::warn!("Refusing to write {} outside {}", path, root.display());
        return None;
    }

    let relative = path.trim_start_matches('/');

    if path.ends_with('/') {
        Some(root.join(relative).join("index.html"))
    } else if path.ends_with(".html") {
        Some(root.join(relative))
    } else {
        None
    }
}

/// Renders handlers of an [`App`] into an output tree.
pub struct StaticRenderer<'a> {
    app: &'a App,
    root: PathBuf,
}

impl<'a> StaticRenderer<'a> {
    pub fn new(app: &'a App, root: impl Into<PathBuf>) -> Self {
        Self {
            app,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render one route, compiling includes into the shared cache.
    ///
    /// Returns the written file, or `None` when the path was skipped.
    pub fn render(
        &self,
        name: &str,
        path: &str,
        includes: &mut IncludeCache,
    ) -> Result<Option<PathBuf>, BuildError> {
        let Some(job) = RenderJob::plan(name, path, &self.root) else {
            tracing::info!("Skipping {}", name);
            return Ok(None);
        };

        if let Some(parent) = job.output.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        tracing::info!("Rendering {}", job.output.display());

        let response = {
            let mut env = self.app.context(&job.path, includes).compile_includes(true);
            self.app.dispatch(&job.name, &mut env)?
        };

        fs::write(&job.output, response.body.as_bytes())
            .map_err(|e| write_error(&job.output, e))?;

        Ok(Some(job.output))
    }

    /// Render a handler to a fixed file, without compiling includes.
    pub fn write_script(&self, name: &str, path: &str, dest: &Path) -> Result<(), BuildError> {
        let mut includes = IncludeCache::new();

        let response = {
            let mut env = self.app.context(path, &mut includes);
            self.app.dispatch(name, &mut env)?
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        tracing::info!("Rendering {}", dest.display());

        fs::write(dest, response.body.as_bytes()).map_err(|e| write_error(dest, e))
    }
}

fn write_error(path: &Path, e: std::io::Error) -> BuildError {
    BuildError::WriteError(format!("{}: {}", path.display(), e))
}
