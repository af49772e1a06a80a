//! The application being baked.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use minijinja::Value;
use serde_json::Map;

use crate::context::RenderEnv;
use crate::handler::{AppError, Handler, Response};
use crate::includes::IncludeCache;
use crate::pages::{PageTemplates, TemplatePage};
use crate::registry::{qualify, HandlerRegistry};
use crate::route::{RouteTable, STATIC_ROUTE};
use crate::scripts::{app_config_js, copy_js, CopyText};

/// Handler producing the runtime config script.
pub const APP_CONFIG_HANDLER: &str = "_app_config_js";

/// Request path of the runtime config script.
pub const APP_CONFIG_PATH: &str = "/js/app_config.js";

/// Handler producing the copy text script.
pub const COPY_HANDLER: &str = "_copy_js";

/// Request path of the copy text script.
pub const COPY_PATH: &str = "/js/copytext.js";

/// Application-wide settings.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Project identifier, exposed as `PROJECT_SLUG`
    pub slug: String,

    /// Directory the site is served from
    pub output_root: PathBuf,

    /// Directory containing page templates
    pub templates_dir: PathBuf,

    /// Supported locales; the first is the default
    pub langs: Vec<String>,

    /// Public values exposed to the browser as `APP_CONFIG`
    pub public_config: Map<String, serde_json::Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            slug: "bake".to_string(),
            output_root: PathBuf::from("www"),
            templates_dir: PathBuf::from("templates"),
            langs: vec!["en".to_string()],
            public_config: Map::new(),
        }
    }
}

impl AppSettings {
    /// Values rendered into `app_config.js`.
    pub fn browser_config(&self) -> Map<String, serde_json::Value> {
        let mut config = self.public_config.clone();
        config.insert("PROJECT_SLUG".to_string(), self.slug.clone().into());
        config.insert("LANGS".to_string(), self.langs.clone().into());
        config
    }
}

/// Route table plus the handlers serving it.
pub struct App {
    settings: AppSettings,
    routes: RouteTable,
    handlers: HandlerRegistry,
    templates: Arc<PageTemplates>,
    /// Template behind each page handler, by qualified name
    pages: HashMap<String, String>,
}

impl App {
    /// Create an application with the built-in static, config and copy routes.
    pub fn new(settings: AppSettings, copy: CopyText) -> Self {
        let browser_config = settings.browser_config();

        let templates = Arc::new(PageTemplates::new(
            &settings.templates_dir,
            vec![
                ("copy", Value::from_serialize(copy.as_value())),
                ("app_config", Value::from_serialize(&browser_config)),
                ("langs", Value::from_serialize(&settings.langs)),
            ],
        ));

        let mut app = Self {
            settings,
            routes: RouteTable::new(),
            handlers: HandlerRegistry::new(),
            templates,
            pages: HashMap::new(),
        };

        app.routes.add(STATIC_ROUTE, "/static/<path:filename>");

        app.routes.add(APP_CONFIG_HANDLER, APP_CONFIG_PATH);
        app.handlers.insert(APP_CONFIG_HANDLER, move |_: &mut RenderEnv<'_>, _: &[String]| {
            app_config_js(&browser_config).map(Response::javascript)
        });

        app.routes.add(COPY_HANDLER, COPY_PATH);
        app.handlers.insert(COPY_HANDLER, move |_: &mut RenderEnv<'_>, _: &[String]| {
            copy_js(&copy).map(Response::javascript)
        });

        app
    }

    /// Declare a route served by `handler`.
    ///
    /// Fails when another handler already answers to `name`.
    pub fn add_route(
        &mut self,
        name: &str,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), AppError> {
        self.handlers.register(name, handler)?;
        self.routes.add(name, pattern);
        Ok(())
    }

    /// Declare a route served by a closure.
    pub fn add_route_fn<F>(&mut self, name: &str, pattern: &str, f: F) -> Result<(), AppError>
    where
        F: Fn(&mut RenderEnv<'_>, &[String]) -> Result<Response, AppError> + Send + Sync + 'static,
    {
        self.add_route(name, pattern, f)
    }

    /// Declare a route rendered from a template in the templates directory.
    ///
    /// A page name may be reused for more patterns only with the same template.
    pub fn add_page(&mut self, name: &str, pattern: &str, template: &str) -> Result<(), AppError> {
        let key = qualify(name);
        if self.pages.get(&key).is_some_and(|existing| existing == template) {
            self.routes.add(name, pattern);
            return Ok(());
        }

        let page = TemplatePage::new(Arc::clone(&self.templates), template);
        self.add_route(name, pattern, page)?;
        self.pages.insert(key, template.to_string());
        Ok(())
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Build a render environment for `path` backed by the build's include cache.
    pub fn context<'a>(&self, path: &str, includes: &'a mut IncludeCache) -> RenderEnv<'a> {
        RenderEnv::new(path, includes)
            .with_langs(&self.settings.langs)
            .with_output_root(&self.settings.output_root)
    }

    /// Resolve `name` and invoke it with the environment's path arguments.
    pub fn dispatch(&self, name: &str, env: &mut RenderEnv<'_>) -> Result<Response, AppError> {
        let handler = self.handlers.resolve(name)?;
        let args = env.args().to_vec();

        handler.call(env, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn settings(root: &std::path::Path) -> AppSettings {
        AppSettings {
            slug: "demo".to_string(),
            output_root: root.join("www"),
            templates_dir: root.join("templates"),
            langs: vec!["en".to_string(), "es".to_string()],
            public_config: Map::new(),
        }
    }

    #[test]
    fn registers_builtin_routes() {
        let temp = tempdir().unwrap();
        let app = App::new(settings(temp.path()), CopyText::empty());

        let names: Vec<_> = app.routes().iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["static", "_app_config_js", "_copy_js"]);
        assert!(app.routes().iter().all(|r| r.internal));
    }

    #[test]
    fn dispatches_runtime_config() {
        let temp = tempdir().unwrap();
        let mut s = settings(temp.path());
        s.public_config.insert("DEBUG".to_string(), json!(false));
        let app = App::new(s, CopyText::empty());

        let mut includes = IncludeCache::new();
        let mut env = app.context(APP_CONFIG_PATH, &mut includes);
        let response = app.dispatch(APP_CONFIG_HANDLER, &mut env).unwrap();

        assert_eq!(response.content_type, "application/javascript");
        assert_eq!(
            response.body,
            r#"window.APP_CONFIG = {"DEBUG":false,"LANGS":["en","es"],"PROJECT_SLUG":"demo"};"#
        );
    }

    #[test]
    fn pages_see_copy_and_locale() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("templates")).unwrap();
        fs::write(
            temp.path().join("templates/index.html"),
            "{{ copy.content.headline }} ({{ lang }} of {{ langs | length }})",
        )
        .unwrap();

        let copy = CopyText::from_value(json!({ "content": { "headline": "Hola" } }));
        let mut app = App::new(settings(temp.path()), copy);
        app.add_page("index", "/<lang>/", "index.html").unwrap();

        let mut includes = IncludeCache::new();
        let mut env = app.context("/es/", &mut includes);
        let response = app.dispatch("app.index", &mut env).unwrap();

        assert_eq!(response.body, "Hola (es of 2)");
    }

    #[test]
    fn closures_receive_positional_arguments() {
        let temp = tempdir().unwrap();
        let mut app = App::new(settings(temp.path()), CopyText::empty());
        app.add_route_fn("blog.post", "/blog/<slug>.html", |env, args| {
            Ok(Response::html(format!("{}:{}", env.path(), args.join("|"))))
        })
        .unwrap();

        let mut includes = IncludeCache::new();
        let mut env = app.context("/blog/hello.html", &mut includes);
        let response = app.dispatch("blog.post", &mut env).unwrap();

        assert_eq!(response.body, "/blog/hello.html:blog|hello.html");
    }

    #[test]
    fn rejects_a_reused_page_name_with_another_template() {
        let temp = tempdir().unwrap();
        let mut app = App::new(settings(temp.path()), CopyText::empty());
        app.add_page("index", "/", "home.html").unwrap();

        let result = app.add_page("index", "/<lang>/", "landing.html");

        assert!(matches!(result, Err(AppError::DuplicateHandler(name)) if name == "app.index"));
        let patterns: Vec<_> = app
            .routes()
            .iter()
            .filter(|r| r.name == "index")
            .map(|r| r.pattern.as_str())
            .collect();
        assert_eq!(patterns, vec!["/"]);
    }

    #[test]
    fn a_page_may_serve_several_patterns() {
        let temp = tempdir().unwrap();
        let mut app = App::new(settings(temp.path()), CopyText::empty());
        app.add_page("index", "/", "index.html").unwrap();
        app.add_page("index", "/<lang>/", "index.html").unwrap();

        let count = app.routes().iter().filter(|r| r.name == "index").count();
        assert_eq!(count, 2);
    }

    #[test]
    fn builtin_handler_names_are_reserved() {
        let temp = tempdir().unwrap();
        let mut app = App::new(settings(temp.path()), CopyText::empty());

        let result = app.add_route_fn(COPY_HANDLER, "/js/other.js", |_, _| {
            Ok(Response::javascript(""))
        });

        assert!(matches!(result, Err(AppError::DuplicateHandler(_))));
    }

    #[test]
    fn copy_markup_is_escaped_unless_marked_safe() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("templates")).unwrap();
        fs::write(
            temp.path().join("templates/index.html"),
            "{{ copy.content.note }}|{{ copy.content.note | safe }}",
        )
        .unwrap();

        let copy = CopyText::from_value(json!({ "content": { "note": "<b>Vote</b> & go" } }));
        let mut app = App::new(settings(temp.path()), copy);
        app.add_page("index", "/", "index.html").unwrap();

        let mut includes = IncludeCache::new();
        let mut env = app.context("/", &mut includes);
        let response = app.dispatch("index", &mut env).unwrap();

        assert_eq!(
            response.body,
            "&lt;b&gt;Vote&lt;&#x2f;b&gt; &amp; go|<b>Vote</b> & go"
        );
    }
}
