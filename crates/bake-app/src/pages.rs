//! Template-backed page handlers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use minijinja::value::Object;
use minijinja::{context, path_loader, Environment, Error, ErrorKind, State, Value};

use crate::context::RenderEnv;
use crate::handler::{AppError, Handler, Response};
use crate::includes::{render_include, IncludeCache, IncludeKind};

/// Context variable holding the include state of the current render.
const INCLUDE_SCOPE: &str = "_includes";

/// Include settings and cache for one render.
#[derive(Debug)]
struct IncludeScope {
    cache: Mutex<IncludeCache>,
    compile: bool,
    root: PathBuf,
}

impl Object for IncludeScope {}

/// Template environment shared by all pages of an application.
///
/// Templates are loaded from disk once and reused by every render.
pub struct PageTemplates {
    env: Environment<'static>,
}

impl PageTemplates {
    /// Load templates lazily from `dir`, exposing `globals` to every page.
    pub fn new(dir: &Path, globals: Vec<(&'static str, Value)>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        env.add_function(IncludeKind::Css.function_name(), css_include);
        env.add_function(IncludeKind::Js.function_name(), js_include);

        for (name, value) in globals {
            env.add_global(name, value);
        }

        Self { env }
    }

    /// Render a template for the request described by `env`.
    ///
    /// The include cache is moved into the render context so the `css_include` /
    /// `js_include` functions can update it, then moved back into `env` before the
    /// outcome is returned.
    pub fn render(
        &self,
        template: &str,
        env: &mut RenderEnv<'_>,
        args: &[String],
    ) -> Result<String, AppError> {
        let scope = Arc::new(IncludeScope {
            cache: Mutex::new(std::mem::take(env.includes())),
            compile: env.compiles_includes(),
            root: env.output_root().to_path_buf(),
        });

        let result = self.render_in_scope(template, env, args, &scope);

        let mut cache = scope.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *env.includes() = std::mem::take(&mut *cache);
        drop(cache);

        result
    }

    fn render_in_scope(
        &self,
        template: &str,
        env: &RenderEnv<'_>,
        args: &[String],
        scope: &Arc<IncludeScope>,
    ) -> Result<String, AppError> {
        let template_error = |e: Error| AppError::Template {
            name: template.to_string(),
            source: e,
        };

        let tmpl = self.env.get_template(template).map_err(template_error)?;

        tmpl.render(context! {
            path => env.path(),
            args => args,
            lang => env.lang(),
            _includes => Value::from_dyn_object(Arc::clone(scope)),
        })
        .map_err(template_error)
    }
}

fn css_include(state: &State, output: String, sources: Vec<String>) -> Result<Value, Error> {
    include(IncludeKind::Css, state, &output, &sources)
}

fn js_include(state: &State, output: String, sources: Vec<String>) -> Result<Value, Error> {
    include(IncludeKind::Js, state, &output, &sources)
}

fn include(
    kind: IncludeKind,
    state: &State,
    output: &str,
    sources: &[String],
) -> Result<Value, Error> {
    let value = state.lookup(INCLUDE_SCOPE).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("{} is only available while rendering a page", kind.function_name()),
        )
    })?;
    let scope = value.downcast_object_ref::<IncludeScope>().ok_or_else(|| {
        Error::new(ErrorKind::InvalidOperation, "include state was overwritten")
    })?;

    let mut cache = scope.cache.lock().unwrap_or_else(PoisonError::into_inner);
    render_include(kind, output, sources, scope.compile, &scope.root, &mut cache)
        .map(Value::from_safe_string)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

/// Handler rendering a single template.
pub struct TemplatePage {
    templates: Arc<PageTemplates>,
    template: String,
}

impl TemplatePage {
    pub fn new(templates: Arc<PageTemplates>, template: impl Into<String>) -> Self {
        Self {
            templates,
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Handler for TemplatePage {
    fn call(&self, env: &mut RenderEnv<'_>, args: &[String]) -> Result<Response, AppError> {
        self.templates
            .render(&self.template, env, args)
            .map(Response::html)
    }
}
