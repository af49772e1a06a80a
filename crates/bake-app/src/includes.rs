//! Compiled CSS/JS includes.
//!
//! Pages reference groups of stylesheets or scripts. During a live render each
//! source gets its own tag. During a build the group is concatenated into a single
//! file the first time any page asks for it, and every later page reuses the tag
//! recorded in the [`IncludeCache`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::handler::AppError;

/// Rendered include fragments keyed by compiled output path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeCache {
    compiled: BTreeMap<String, String>,
}

impl IncludeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, output: &str) -> Option<&str> {
        self.compiled.get(output).map(String::as_str)
    }

    pub fn insert(&mut self, output: impl Into<String>, fragment: impl Into<String>) {
        self.compiled.insert(output.into(), fragment.into());
    }

    pub fn contains(&self, output: &str) -> bool {
        self.compiled.contains_key(output)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Iterate over (output, fragment) pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.compiled.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Kind of asset an include refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    Css,
    Js,
}

impl IncludeKind {
    /// Name of the template function exposing this include kind.
    pub fn function_name(self) -> &'static str {
        match self {
            IncludeKind::Css => "css_include",
            IncludeKind::Js => "js_include",
        }
    }

    /// HTML tag referencing a single asset.
    pub fn tag(self, src: &str) -> String {
        match self {
            IncludeKind::Css => {
                format!(r#"<link rel="stylesheet" type="text/css" href="{}" />"#, src)
            }
            IncludeKind::Js => {
                format!(r#"<script type="text/javascript" src="{}"></script>"#, src)
            }
        }
    }
}

/// Render the tags for an include group.
///
/// With `compile` off this is one tag per source. With it on, `output` is built from
/// the concatenated sources (paths relative to `root`) unless the cache already holds
/// it, and a single tag for `output` is returned.
pub fn render_include(
    kind: IncludeKind,
    output: &str,
    sources: &[String],
    compile: bool,
    root: &Path,
    cache: &mut IncludeCache,
) -> Result<String, AppError> {
    if !compile {
        let tags: Vec<String> = sources.iter().map(|src| kind.tag(src)).collect();
        return Ok(tags.join("\n"));
    }

    if let Some(fragment) = cache.get(output) {
        tracing::debug!("Reusing compiled include {}", output);
        return Ok(fragment.to_string());
    }

    let mut combined = String::new();
    for src in sources {
        let path = root.join(src.trim_start_matches('/'));
        let content = fs::read_to_string(&path).map_err(|e| AppError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        combined.push_str(&content);
        if !content.ends_with('\n') {
            combined.push('\n');
        }
    }

    let out_path = root.join(output.trim_start_matches('/'));
    let write_error = |e: std::io::Error| AppError::WriteError {
        path: out_path.display().to_string(),
        source: e,
    };

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(&out_path, combined).map_err(write_error)?;

    tracing::info!("Compiled {} sources into {}", sources.len(), out_path.display());

    let fragment = kind.tag(output);
    cache.insert(output, fragment.clone());

    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn emits_one_tag_per_source_when_not_compiling() {
        let temp = tempdir().unwrap();
        let mut cache = IncludeCache::new();

        let html = render_include(
            IncludeKind::Js,
            "js/app.min.js",
            &sources(&["js/a.js", "js/b.js"]),
            false,
            temp.path(),
            &mut cache,
        )
        .unwrap();

        assert_eq!(
            html,
            "<script type=\"text/javascript\" src=\"js/a.js\"></script>\n\
             <script type=\"text/javascript\" src=\"js/b.js\"></script>"
        );
        assert!(cache.is_empty());
        assert!(!temp.path().join("js/app.min.js").exists());
    }

    #[test]
    fn compiles_sources_into_one_file() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("css")).unwrap();
        fs::write(temp.path().join("css/a.css"), "a {}").unwrap();
        fs::write(temp.path().join("css/b.css"), "b {}\n").unwrap();

        let mut cache = IncludeCache::new();
        let html = render_include(
            IncludeKind::Css,
            "css/app.min.css",
            &sources(&["css/a.css", "/css/b.css"]),
            true,
            temp.path(),
            &mut cache,
        )
        .unwrap();

        assert_eq!(
            html,
            r#"<link rel="stylesheet" type="text/css" href="css/app.min.css" />"#
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("css/app.min.css")).unwrap(),
            "a {}\nb {}\n"
        );
        assert_eq!(cache.get("css/app.min.css"), Some(html.as_str()));
    }

    #[test]
    fn reuses_cached_include_without_recompiling() {
        let temp = tempdir().unwrap();
        let mut cache = IncludeCache::new();
        cache.insert("js/app.min.js", "<cached>");

        // Sources don't exist; a recompile would fail.
        let html = render_include(
            IncludeKind::Js,
            "js/app.min.js",
            &sources(&["js/missing.js"]),
            true,
            temp.path(),
            &mut cache,
        )
        .unwrap();

        assert_eq!(html, "<cached>");
        assert!(!temp.path().join("js/app.min.js").exists());
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let temp = tempdir().unwrap();
        let mut cache = IncludeCache::new();

        let result = render_include(
            IncludeKind::Css,
            "css/app.min.css",
            &sources(&["css/nope.css"]),
            true,
            temp.path(),
            &mut cache,
        );

        assert!(matches!(result, Err(AppError::ReadError { .. })));
        assert!(cache.is_empty());
    }
}
