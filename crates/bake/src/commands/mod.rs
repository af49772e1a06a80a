//! One module per build step exposed on the command line.

pub mod assets;
pub mod render;
pub mod scripts;
