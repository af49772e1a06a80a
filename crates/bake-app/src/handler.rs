//! Handler trait, responses and application errors.

use crate::context::RenderEnv;

/// Content produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// MIME type of the body
    pub content_type: String,

    /// Response body
    pub body: String,
}

impl Response {
    /// An HTML page.
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
        }
    }

    /// A JavaScript file.
    pub fn javascript(body: impl Into<String>) -> Self {
        Self {
            content_type: "application/javascript".to_string(),
            body: body.into(),
        }
    }
}

/// Errors raised while resolving or running handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No handler registered for {0}")]
    HandlerNotFound(String),

    #[error("A different handler is already registered as {0}")]
    DuplicateHandler(String),

    #[error("Failed to render template {name}: {source}")]
    Template {
        name: String,
        source: minijinja::Error,
    },

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid copy document {path}: {message}")]
    CopyError { path: String, message: String },

    #[error("Failed to serialize script: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Handler failed: {0}")]
    HandlerError(String),
}

/// Something that produces page content for a set of path arguments.
///
/// `args` are the non-empty segments of the rendered path.
pub trait Handler: Send + Sync {
    fn call(&self, env: &mut RenderEnv<'_>, args: &[String]) -> Result<Response, AppError>;
}

impl<F> Handler for F
where
    F: Fn(&mut RenderEnv<'_>, &[String]) -> Result<Response, AppError> + Send + Sync,
{
    fn call(&self, env: &mut RenderEnv<'_>, args: &[String]) -> Result<Response, AppError> {
        self(env, args)
    }
}
