//! Render environment handed to handlers.
//!
//! A [`RenderEnv`] stands in for an inbound request during a build: it carries the
//! requested path, its positional arguments, the active locale and the include
//! cache shared across the whole build. The cache is borrowed, so it is handed
//! back to the caller as soon as the environment goes out of scope, whether the
//! handler succeeded or not.

use std::path::{Path, PathBuf};

use crate::handler::AppError;
use crate::includes::{render_include, IncludeCache, IncludeKind};

/// Request-scoped state for one handler invocation.
#[derive(Debug)]
pub struct RenderEnv<'a> {
    path: String,
    args: Vec<String>,
    lang: Option<String>,
    compile_includes: bool,
    output_root: PathBuf,
    includes: &'a mut IncludeCache,
}

impl<'a> RenderEnv<'a> {
    /// Create an environment for `path` with includes left uncompiled.
    pub fn new(path: &str, includes: &'a mut IncludeCache) -> Self {
        Self {
            path: path.to_string(),
            args: path_args(path),
            lang: None,
            compile_includes: false,
            output_root: PathBuf::from("www"),
            includes,
        }
    }

    /// Pick the locale from the first path segment, falling back to the first of `langs`.
    pub fn with_langs(mut self, langs: &[String]) -> Self {
        self.lang = self
            .args
            .first()
            .filter(|segment| langs.contains(segment))
            .or_else(|| langs.first())
            .cloned();
        self
    }

    /// Directory compiled includes are read from and written to.
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Whether includes should be compiled into combined files during this render.
    pub fn compile_includes(mut self, compile: bool) -> Self {
        self.compile_includes = compile;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Non-empty path segments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    pub fn compiles_includes(&self) -> bool {
        self.compile_includes
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The include cache shared across the build.
    pub fn includes(&mut self) -> &mut IncludeCache {
        &mut *self.includes
    }

    /// Render an include tag, compiling it on first use when compilation is on.
    pub fn include(
        &mut self,
        kind: IncludeKind,
        output: &str,
        sources: &[String],
    ) -> Result<String, AppError> {
        render_include(
            kind,
            output,
            sources,
            self.compile_includes,
            &self.output_root,
            &mut *self.includes,
        )
    }
}

/// Split a path into its non-empty segments.
pub fn path_args(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
