//! The `bazel query` half of file-query pattern resolution.

use std::process::Command;

use anyhow::{Context, Result};
use log::trace;

use crate::error::DriverError;

/// Runs `bazel query <expression>` and returns its stdout, split into
/// non-empty, newline-delimited labels.
pub fn query(expression: &str) -> Result<Vec<String>> {
    trace!("bazel::query: bazel query {:?}", expression);

    let output = Command::new("bazel")
        .arg("query")
        .arg(expression)
        .output()
        .context("could not spawn bazel query")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DriverError::BuildSystem(format!("query {:?} failed: {}", expression, stderr)).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().map(str::to_owned).filter(|l| !l.is_empty()).collect())
}

/// Ask Bazel what label names the given (already execroot-relative)
/// source file.
pub fn label_for_file(relative_path: &str) -> Result<String> {
    let labels = query(relative_path)?;
    labels
        .into_iter()
        .next()
        .with_context(|| format!("bazel query for {:?} returned no label", relative_path))
}

/// Derive the package-wildcard label from `file_label` and ask for every
/// Go library/binary rule in that package whose `srcs` attribute contains
/// `file_label`.
pub fn go_targets_owning_file(file_label: &str, original_path: &str) -> Result<Vec<String>> {
    let colon = file_label
        .find(':')
        .with_context(|| format!("no \":\" in file label {:?} to be found in bazel targets", file_label))?;
    let package_wildcard = format!("{}*", &file_label[..=colon]);

    let expression =
        format!("kind(\"go_library|go_binary\", attr(\"srcs\", {file_label}, {package_wildcard}))");
    let targets = query(&expression)?;

    if targets.is_empty() {
        return Err(DriverError::Classification(format!(
            "no targets in {:?} contain the source file {:?}",
            &file_label[..colon],
            original_path
        ))
        .into());
    }

    Ok(targets)
}
