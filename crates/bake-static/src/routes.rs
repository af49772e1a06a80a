//! Enumerate the routes that become static pages.

use bake_app::{Route, RouteTable, LANG_ROOT_PATTERN};

/// A handler name paired with a concrete path to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub name: String,
    pub path: String,
}

impl RenderTarget {
    fn new(name: &str, path: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
        }
    }
}

/// Walks a route table, skipping utility routes and expanding the locale root.
#[derive(Debug, Clone, Copy)]
pub struct RouteEnumerator<'a> {
    routes: &'a RouteTable,
    langs: &'a [String],
}

impl<'a> RouteEnumerator<'a> {
    pub fn new(routes: &'a RouteTable, langs: &'a [String]) -> Self {
        Self { routes, langs }
    }

    /// Lazily yield render targets in declaration order.
    ///
    /// Each call starts a fresh pass over the route table.
    pub fn targets(&self) -> impl Iterator<Item = RenderTarget> + 'a {
        let routes = self.routes;
        let langs = self.langs;

        routes
            .iter()
            .filter(|route| {
                if route.internal {
                    tracing::info!("Skipping {}", route.name);
                }
                !route.internal
            })
            .flat_map(move |route| expand(route, langs))
    }
}

/// Render targets for a single route.
fn expand(route: &Route, langs: &[String]) -> Vec<RenderTarget> {
    if route.is_lang_root() {
        return langs
            .iter()
            .map(|lang| RenderTarget::new(&route.name, LANG_ROOT_PATTERN.replace("<lang>", lang)))
            .collect();
    }

    let params = route.params();
    if !params.is_empty() {
        tracing::warn!(
            "Route {} has unbound parameters ({}); rendering {} literally",
            route.name,
            params.join(", "),
            route.pattern
        );
    }

    vec![RenderTarget::new(&route.name, route.pattern.as_str())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn paths(targets: impl Iterator<Item = RenderTarget>) -> Vec<(String, String)> {
        targets.map(|t| (t.name, t.path)).collect()
    }

    #[test]
    fn skips_static_and_private_routes() {
        let mut table = RouteTable::new();
        table.add("home", "/");
        table.add("static", "/static/<path>");
        table.add("_copy_js", "/js/copytext.js");
        table.add("about", "/about.html");
        let langs = langs(&["en"]);

        let targets = paths(RouteEnumerator::new(&table, &langs).targets());

        assert_eq!(
            targets,
            vec![
                ("home".to_string(), "/".to_string()),
                ("about".to_string(), "/about.html".to_string()),
            ]
        );
    }

    #[test]
    fn expands_lang_root_per_locale() {
        let mut table = RouteTable::new();
        table.add("index", "/<lang>/");
        let langs = langs(&["en", "es"]);

        let targets = paths(RouteEnumerator::new(&table, &langs).targets());

        assert_eq!(
            targets,
            vec![
                ("index".to_string(), "/en/".to_string()),
                ("index".to_string(), "/es/".to_string()),
            ]
        );
    }

    #[test]
    fn lang_root_without_locales_yields_nothing() {
        let mut table = RouteTable::new();
        table.add("index", "/<lang>/");

        assert_eq!(RouteEnumerator::new(&table, &[]).targets().count(), 0);
    }

    #[test]
    fn restarts_from_the_beginning() {
        let mut table = RouteTable::new();
        table.add("home", "/");
        table.add("about", "/about.html");
        let langs = langs(&["en"]);
        let routes = RouteEnumerator::new(&table, &langs);

        let first: Vec<_> = routes.targets().collect();
        let second: Vec<_> = routes.targets().collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
