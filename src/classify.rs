//! Partitions input patterns into {file-query, stdlib, build-target}
//! buckets, then resolves file-queries to build targets via `bazel query`.

use anyhow::{Context, Result};
use log::{debug, trace};

use crate::bazel::query;
use crate::context::RequestContext;
use crate::error::DriverError;
use crate::stdlib::table;

const FILE_QUERY_PREFIX: &str = "file=";

/// The three pattern buckets `classify` partitions its input into.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Classified {
    pub build_targets: Vec<String>,
    /// Standard-library import paths (already normalized; a pattern given
    /// as the synthetic label is translated back to its import path here).
    pub stdlib_patterns: Vec<String>,
    /// Payloads of `file=` patterns, not yet resolved to labels.
    pub file_queries: Vec<String>,
}

/// Phase one: inspect each pattern, in order, and route it to a bucket.
pub fn classify(patterns: &[String]) -> Result<Classified> {
    if patterns.is_empty() {
        return Err(DriverError::Input("no patterns given".to_owned()).into());
    }

    let mut out = Classified::default();
    for pattern in patterns {
        if let Some(payload) = pattern.strip_prefix(FILE_QUERY_PREFIX) {
            if payload.is_empty() {
                return Err(DriverError::Input("file= pattern has an empty path".to_owned()).into());
            }
            out.file_queries.push(payload.to_owned());
            continue;
        }

        if let Some(import_path) = table::import_path_for_label(pattern) {
            out.stdlib_patterns.push(import_path.to_owned());
            continue;
        }

        if table::is_stdlib_import_path(pattern) {
            out.stdlib_patterns.push(pattern.clone());
            continue;
        }

        out.build_targets.push(pattern.clone());
    }

    trace!(
        "classify: {} build target(s), {} stdlib pattern(s), {} file quer(y/ies)",
        out.build_targets.len(),
        out.stdlib_patterns.len(),
        out.file_queries.len()
    );
    Ok(out)
}

/// Phase two: resolve each `file=` payload to the build targets that list
/// it as a source.
pub fn resolve_file_queries(ctx: &RequestContext, file_queries: &[String]) -> Result<Vec<String>> {
    let mut targets = Vec::new();
    for raw_path in file_queries {
        let relative = normalize_path(ctx, raw_path)?;
        let file_label = query::label_for_file(&relative)
            .with_context(|| format!("resolving file= pattern {:?}", raw_path))?;
        let owners = query::go_targets_owning_file(&file_label, raw_path)?;
        debug!("classify: file={:?} resolved to {} target(s) via {}", raw_path, owners.len(), file_label);
        targets.extend(owners);
    }
    Ok(targets)
}

/// An absolute path must lie under the execution root and is rewritten
/// relative to it; a relative path is passed through.
fn normalize_path(ctx: &RequestContext, raw_path: &str) -> Result<String> {
    let path = std::path::Path::new(raw_path);
    if !path.is_absolute() {
        return Ok(raw_path.to_owned());
    }

    let relative = path.strip_prefix(&ctx.exec_root).map_err(|_| {
        DriverError::Classification(format!(
            "{} is not under execution root {}",
            raw_path,
            ctx.exec_root.display()
        ))
    })?;
    Ok(relative.to_string_lossy().into_owned())
}
