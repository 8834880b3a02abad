//! Request-scoped configuration.
//!
//! Rather than reading `PWD`/`GOROOT`/`GOARCH`/`GOOS` ad hoc wherever a
//! component needs them, every component here takes a `&RequestContext`
//! instead of touching the environment directly, so the whole request is a
//! pure function of `(patterns, mode, flags, ctx)`.

use std::env;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

/// Everything a single invocation needs to know about its environment.
/// Constructed once in `main` and threaded through by reference.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The Bazel execution root; absolute file-query paths must lie under it.
    pub exec_root: PathBuf,
    /// The directory the driver was invoked from (used to absolutize the
    /// relative file paths Bazel's aspect outputs report).
    pub pwd: PathBuf,
    pub goarch: String,
    pub goos: String,
    pub goroot: PathBuf,
}

impl RequestContext {
    pub fn from_env() -> Result<RequestContext> {
        let exec_root = env::var_os("BAZEL_EXEC_ROOT")
            .map(PathBuf::from)
            .context("BAZEL_EXEC_ROOT must be set")?;
        let pwd = env::current_dir().context("could not determine current directory")?;
        let goarch = env::var("GOARCH").unwrap_or_else(|_| "amd64".to_owned());
        let goos = env::var("GOOS").unwrap_or_else(|_| "linux".to_owned());
        let goroot = env::var_os("GOROOT")
            .map(PathBuf::from)
            .context("GOROOT must be set")?;

        Ok(RequestContext { exec_root, pwd, goarch, goos, goroot })
    }

    /// Resolve a path relative to the current working directory, as the
    /// aspect outputs' relative file lists are meant to be interpreted.
    pub fn absolutize(&self, relative: &str) -> PathBuf {
        self.pwd.join(relative)
    }
}
