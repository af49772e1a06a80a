//! The application side of a bake build.
//!
//! An [`App`] owns a route table, the handlers serving each route and the template
//! environment its pages render with. Handlers run against a [`RenderEnv`] instead of
//! a live request, so the same pages can be rendered to disk one route at a time.

pub mod app;
pub mod context;
pub mod handler;
pub mod includes;
pub mod pages;
pub mod registry;
pub mod route;
pub mod scripts;

pub use app::{App, AppSettings, APP_CONFIG_HANDLER, APP_CONFIG_PATH, COPY_HANDLER, COPY_PATH};
pub use context::{path_args, RenderEnv};
pub use handler::{AppError, Handler, Response};
pub use includes::{render_include, IncludeCache, IncludeKind};
pub use pages::{PageTemplates, TemplatePage};
pub use registry::{qualify, HandlerRegistry, DEFAULT_MODULE};
pub use route::{is_internal_name, Route, RouteTable, LANG_ROOT_PATTERN, STATIC_ROUTE};
pub use scripts::{app_config_js, copy_js, CopyText};
