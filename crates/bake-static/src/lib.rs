//! Static build pipeline for bake.
//!
//! Compiles stylesheets and client templates with external tools, renders the
//! runtime config and copy scripts, then renders every route of an
//! [`App`](bake_app::App) into a tree of flat files.

pub mod pipeline;
pub mod renderer;
pub mod routes;
pub mod tools;

pub use pipeline::{BuildConfig, BuildError, BuildReport, Pipeline};
pub use renderer::{output_path, RenderJob, StaticRenderer};
pub use routes::{RenderTarget, RouteEnumerator};
pub use tools::{run_shell, shell_quote, ExternalTool, ToolError, DEFAULT_TOOL_TIMEOUT};
