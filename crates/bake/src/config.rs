//! `bake.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use bake_app::{App, AppSettings, CopyText};
use bake_static::{BuildConfig, ExternalTool, Pipeline};
use serde::Deserialize;

/// Configuration file structure (bake.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub app_config: toml::Table,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_slug")]
    pub slug: String,
    #[serde(default = "default_www")]
    pub www: String,
    #[serde(default = "default_less")]
    pub less: String,
    #[serde(default = "default_jst")]
    pub jst: String,
    #[serde(default = "default_templates")]
    pub templates: String,
    #[serde(default = "default_copy")]
    pub copy: String,
    #[serde(default = "default_langs")]
    pub langs: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            slug: default_slug(),
            www: default_www(),
            less: default_less(),
            jst: default_jst(),
            templates: default_templates(),
            copy: default_copy(),
            langs: default_langs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub lessc: ToolConfig,
    #[serde(default)]
    pub jst: ToolConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            lessc: ToolConfig::default(),
            jst: ToolConfig::default(),
        }
    }
}

/// Overrides for one external tool.
#[derive(Debug, Deserialize, Default)]
pub struct ToolConfig {
    pub command: Option<String>,
    pub fatal: Option<bool>,
}

/// A page route served by a template.
#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    pub pattern: String,
    /// Template file; defaults to `<name>.html` with dots as directories
    pub template: Option<String>,
}

impl RouteConfig {
    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| format!("{}.html", self.name.replace('.', "/")))
    }
}

fn default_slug() -> String {
    "bake".to_string()
}
fn default_www() -> String {
    "www".to_string()
}
fn default_less() -> String {
    "less".to_string()
}
fn default_jst() -> String {
    "jst".to_string()
}
fn default_templates() -> String {
    "templates".to_string()
}
fn default_copy() -> String {
    "data/copy.yaml".to_string()
}
fn default_langs() -> Vec<String> {
    vec!["en".to_string()]
}
fn default_timeout_secs() -> u64 {
    120
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = parse_config(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    tracing::debug!("No config at {}, using defaults", path.display());
    Ok(ConfigFile::default())
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

impl ConfigFile {
    /// Settings for the application being rendered.
    pub fn app_settings(&self) -> Result<AppSettings> {
        let public_config = match serde_json::to_value(&self.app_config)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Ok(AppSettings {
            slug: self.project.slug.clone(),
            output_root: PathBuf::from(&self.project.www),
            templates_dir: PathBuf::from(&self.project.templates),
            langs: self.project.langs.clone(),
            public_config,
        })
    }

    /// Settings for the build steps.
    pub fn build_config(&self) -> BuildConfig {
        let defaults = BuildConfig::default();
        let timeout = Duration::from_secs(self.tools.timeout_secs);

        BuildConfig {
            www_dir: PathBuf::from(&self.project.www),
            less_dir: PathBuf::from(&self.project.less),
            jst_dir: PathBuf::from(&self.project.jst),
            lessc: apply_tool(defaults.lessc, &self.tools.lessc, timeout),
            jst: apply_tool(defaults.jst, &self.tools.jst, timeout),
        }
    }

    /// The application with every configured page route.
    pub fn build_app(&self) -> Result<App> {
        let copy = CopyText::load(Path::new(&self.project.copy))?;
        let mut app = App::new(self.app_settings()?, copy);

        for route in &self.routes {
            app.add_page(&route.name, &route.pattern, &route.template())?;
        }

        Ok(app)
    }

    pub fn pipeline(&self) -> Result<Pipeline> {
        Ok(Pipeline::new(self.build_config(), self.build_app()?))
    }
}

fn apply_tool(mut tool: ExternalTool, overrides: &ToolConfig, timeout: Duration) -> ExternalTool {
    if let Some(command) = &overrides.command {
        tool.program = command.clone();
    }
    if let Some(fatal) = overrides.fatal {
        tool.fatal = fatal;
    }
    tool.with_timeout(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_empty() {
        let config = parse_config("").unwrap();
        let build = config.build_config();

        assert_eq!(config.project.langs, vec!["en"]);
        assert_eq!(build.www_dir, PathBuf::from("www"));
        assert_eq!(build.lessc.program, "node_modules/less/bin/lessc");
        assert!(build.lessc.fatal);
        assert!(!build.jst.fatal);
        assert_eq!(build.jst.timeout, Duration::from_secs(120));
    }

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
[project]
slug = "elections"
www = "public"
langs = ["en", "es"]

[tools]
timeout_secs = 30

[tools.jst]
command = "jst"
fatal = true

[app_config]
DEBUG = false
S3_BUCKET = "apps.example.org"

[[routes]]
name = "index"
pattern = "/<lang>/"

[[routes]]
name = "blog.about"
pattern = "/about.html"
template = "about.html"
"#,
        )
        .unwrap();

        let build = config.build_config();
        assert_eq!(build.www_dir, PathBuf::from("public"));
        assert_eq!(build.jst.program, "jst");
        assert!(build.jst.fatal);
        assert_eq!(build.lessc.timeout, Duration::from_secs(30));

        let settings = config.app_settings().unwrap();
        assert_eq!(settings.slug, "elections");
        assert_eq!(settings.langs, vec!["en", "es"]);
        assert_eq!(settings.public_config["S3_BUCKET"], "apps.example.org");

        assert_eq!(config.routes[0].template(), "index.html");
        assert_eq!(config.routes[1].template(), "about.html");
    }

    #[test]
    fn dotted_route_names_map_to_template_directories() {
        let route = RouteConfig {
            name: "blog.post".to_string(),
            pattern: "/post.html".to_string(),
            template: None,
        };

        assert_eq!(route.template(), "blog/post.html");
    }

    #[test]
    fn rejects_malformed_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bake.toml");
        fs::write(&path, "[project\nslug = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load_config(&temp.path().join("bake.toml")).unwrap();

        assert_eq!(config.project.www, "www");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn builds_app_with_configured_pages() {
        let temp = tempdir().unwrap();
        let mut config = parse_config(
            r#"
[[routes]]
name = "index"
pattern = "/"
"#,
        )
        .unwrap();
        config.project.copy = temp.path().join("copy.yaml").display().to_string();

        let app = config.build_app().unwrap();

        assert!(app.routes().get("index").is_some());
        assert!(app.handlers().contains("app.index"));
    }
}
