//! Route table for the application being baked.

use std::sync::LazyLock;

use regex::Regex;

/// Pattern of the per-locale landing page.
///
/// Routes declared with exactly this pattern are rendered once per configured locale.
pub const LANG_ROOT_PATTERN: &str = "/<lang>/";

/// Name of the reserved route that serves files from the static directory.
pub const STATIC_ROUTE: &str = "static";

/// Prefix marking helper endpoints that never become standalone pages.
pub const INTERNAL_PREFIX: char = '_';

/// A named mapping from a URL pattern to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Handler name, optionally qualified as `module.function`
    pub name: String,

    /// URL pattern, e.g. `/about.html` or `/<lang>/`
    pub pattern: String,

    /// Whether this is a utility route excluded from static rendering
    pub internal: bool,
}

impl Route {
    /// Create a route, deriving whether it is internal from its name.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        let name = name.into();
        let internal = is_internal_name(&name);

        Self {
            name,
            pattern: pattern.into(),
            internal,
        }
    }

    /// Names of the path parameters in the pattern, in order.
    ///
    /// `/posts/<int:year>/<slug>/` yields `["year", "slug"]`.
    pub fn params(&self) -> Vec<&str> {
        static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"<(?:[a-zA-Z_][a-zA-Z0-9_]*:)?([a-zA-Z_][a-zA-Z0-9_]*)>")
                .expect("Invalid route parameter regex")
        });

        PARAM_RE
            .captures_iter(&self.pattern)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Whether this route is the per-locale landing page.
    pub fn is_lang_root(&self) -> bool {
        self.pattern == LANG_ROOT_PATTERN
    }
}

/// Whether a handler name denotes a utility route.
pub fn is_internal_name(name: &str) -> bool {
    name == STATIC_ROUTE || name.starts_with(INTERNAL_PREFIX)
}

/// Ordered collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Declaration order is render order.
    pub fn add(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        self.routes.push(Route::new(name, pattern));
    }

    /// Iterate over routes in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    /// Find the first route registered under a name.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
