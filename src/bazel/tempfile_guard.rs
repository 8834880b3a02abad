//! The build-event-stream sink needs guaranteed cleanup regardless of which
//! exit path the build driver takes. `tempfile::NamedTempFile` already
//! removes its backing file on `Drop`; this module exists only to name that
//! contract at the call site and to give us a place to read the file back
//! once Bazel has finished writing it.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

pub struct EventFile {
    file: NamedTempFile,
}

impl EventFile {
    pub fn create(dir: &Path) -> Result<EventFile> {
        let file = tempfile::Builder::new()
            .prefix("gopackagesdriver-bazel-bep-")
            .suffix(".bin")
            .tempfile_in(dir)
            .context("unable to create temporary file for storing bazel build output info")?;
        Ok(EventFile { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the whole event stream back into memory once Bazel has exited.
    /// The backing file is removed when `self` (and thus the inner
    /// `NamedTempFile`) is dropped, on every exit path including this one
    /// returning an error.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.file
            .read_to_end(&mut buf)
            .context("could not read bazel build event file")?;
        Ok(buf)
    }
}
