//! Runtime config and copy text, rendered as JavaScript globals.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::handler::AppError;

/// Editorial copy, organized as sheets of key/value strings.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyText {
    doc: Value,
}

impl CopyText {
    /// Copy with no sheets.
    pub fn empty() -> Self {
        Self {
            doc: Value::Object(Map::new()),
        }
    }

    /// Wrap an already parsed document. Anything but an object is treated as empty.
    pub fn from_value(doc: Value) -> Self {
        match doc {
            Value::Object(_) => Self { doc },
            _ => Self::empty(),
        }
    }

    /// Load copy from a YAML document.
    ///
    /// A missing file yields empty copy; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            tracing::warn!("Copy document not found: {}", path.display());
            return Ok(Self::empty());
        }

        let content = fs::read_to_string(path).map_err(|e| AppError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let doc: Value = serde_yaml::from_str(&content).map_err(|e| AppError::CopyError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        match doc {
            Value::Object(_) => Ok(Self { doc }),
            Value::Null => Ok(Self::empty()),
            _ => Err(AppError::CopyError {
                path: path.display().to_string(),
                message: "expected a mapping of sheets".to_string(),
            }),
        }
    }

    /// Look up a single entry.
    pub fn get(&self, sheet: &str, key: &str) -> Option<&str> {
        self.doc.get(sheet)?.get(key)?.as_str()
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }
}

impl Default for CopyText {
    fn default() -> Self {
        Self::empty()
    }
}

/// `window.COPY = {...};`
pub fn copy_js(copy: &CopyText) -> Result<String, AppError> {
    Ok(format!("window.COPY = {};", serde_json::to_string(copy.as_value())?))
}

/// `window.APP_CONFIG = {...};`
pub fn app_config_js(config: &Map<String, Value>) -> Result<String, AppError> {
    Ok(format!("window.APP_CONFIG = {};", serde_json::to_string(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn loads_sheets_from_yaml() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("copy.yaml");
        fs::write(&path, "content:\n  headline: Hello\n  tagline: World\n").unwrap();

        let copy = CopyText::load(&path).unwrap();

        assert_eq!(copy.get("content", "headline"), Some("Hello"));
        assert_eq!(copy.get("content", "missing"), None);
        assert_eq!(copy.get("nope", "headline"), None);
    }

    #[test]
    fn missing_copy_is_empty() {
        let temp = tempdir().unwrap();

        let copy = CopyText::load(&temp.path().join("copy.yaml")).unwrap();

        assert_eq!(copy, CopyText::empty());
    }

    #[test]
    fn rejects_non_mapping_copy() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("copy.yaml");
        fs::write(&path, "- just\n- a list\n").unwrap();

        let result = CopyText::load(&path);

        assert!(matches!(result, Err(AppError::CopyError { .. })));
    }

    #[test]
    fn renders_copy_script() {
        let copy = CopyText::from_value(json!({ "content": { "headline": "Hi" } }));

        assert_eq!(
            copy_js(&copy).unwrap(),
            r#"window.COPY = {"content":{"headline":"Hi"}};"#
        );
    }

    #[test]
    fn renders_app_config_script_with_sorted_keys() {
        let mut config = Map::new();
        config.insert("PROJECT_SLUG".to_string(), json!("demo"));
        config.insert("LANGS".to_string(), json!(["en", "es"]));

        assert_eq!(
            app_config_js(&config).unwrap(),
            r#"window.APP_CONFIG = {"LANGS":["en","es"],"PROJECT_SLUG":"demo"};"#
        );
    }
}
