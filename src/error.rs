//! Error taxonomy. Each variant corresponds to one broad failure category;
//! call sites attach additional context with `anyhow::Context` as errors
//! propagate, but the outermost kind is always one of these so the CLI
//! layer can report failures uniformly.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0}")]
    Input(String),

    #[error("{0}")]
    Classification(String),

    #[error("bazel exited with an error: {0}")]
    BuildSystem(String),

    #[error("{0}")]
    Parse(String),

    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("unsupported load mode: {0:?}")]
    Mode(crate::load_mode::LoadMode),
}

pub type Result<T> = anyhow::Result<T>;
