//! `gopackagesdriver`: a `go/packages` driver backed by Bazel. One
//! invocation resolves a set of patterns against a Bazel workspace into a
//! dependency graph of package descriptors.

pub mod aspect;
pub mod assemble;
pub mod bazel;
pub mod classify;
pub mod context;
pub mod error;
pub mod graph;
pub mod import_scan;
pub mod load_mode;
pub mod protocol;
pub mod stdlib;

use anyhow::Result;
use log::debug;

use context::RequestContext;
use protocol::{Request, Response};

/// Runs one request end to end: classify → (build driver → event stream →
/// aspect parser) / stdlib resolver → graph stitcher → response assembler.
pub fn run_request(ctx: &RequestContext, patterns: &[String], request: &Request) -> Result<Response> {
    let mode = request.mode.0;
    debug!("run_request: {} pattern(s), mode={:?}", patterns.len(), mode);

    let classified = classify::classify(patterns)?;

    let mut build_targets = classified.build_targets;
    if !classified.file_queries.is_empty() {
        let resolved = classify::resolve_file_queries(ctx, &classified.file_queries)?;
        build_targets.extend(resolved);
    }

    let (pkgs, roots) = graph::build(ctx, mode, &build_targets, &classified.stdlib_patterns, &request.build_flags)?;

    Ok(assemble::assemble(ctx, mode, pkgs, roots))
}
