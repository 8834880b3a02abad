//! Drives Bazel to materialize per-target metadata artifacts through a
//! build-event stream.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use log::{debug, trace};

use crate::error::DriverError;
use crate::load_mode::LoadMode;

use super::tempfile_guard::EventFile;

const ASPECT_BASE: &str = "@io_bazel_rules_go//go:def.bzl%";
pub const DEFAULT_OUTPUT_GROUP: &str = "gopackagesdriver_data";
const ARCHIVES_OUTPUT_GROUP: &str = "gopackagesdriver_archives";
const DEPS_OUTPUT_GROUP: &str = "gopackagesdriver_deps_data";

/// The aspect + output-group combination selected for a given load mode.
struct AspectPlan {
    aspect: &'static str,
    output_groups: Vec<&'static str>,
}

fn select_aspect(mode: LoadMode) -> Result<AspectPlan> {
    if mode.contains(LoadMode::DEPS) {
        Ok(AspectPlan {
            aspect: "gopackagesdriver_export",
            output_groups: vec![DEFAULT_OUTPUT_GROUP, ARCHIVES_OUTPUT_GROUP, DEPS_OUTPUT_GROUP],
        })
    } else if mode.intersects(LoadMode::COMPILED_FILES | LoadMode::EXPORTS_FILE | LoadMode::IMPORTS) {
        Ok(AspectPlan {
            aspect: "gopackagesdriver_export_nodeps",
            output_groups: vec![DEFAULT_OUTPUT_GROUP, ARCHIVES_OUTPUT_GROUP],
        })
    } else if mode.intersects(LoadMode::NAME | LoadMode::FILES) {
        Ok(AspectPlan { aspect: "gopackagesdriver_files", output_groups: vec![DEFAULT_OUTPUT_GROUP] })
    } else {
        Err(DriverError::Mode(mode).into())
    }
}

/// Invokes `bazel build` with the aspect selected for `mode`, capturing a
/// binary build-event stream, and returns its raw bytes for
/// `crate::bazel::event_stream` to decode.
pub fn build_aspects(mode: LoadMode, build_flags: &[String], targets: &[String]) -> Result<Vec<u8>> {
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    let plan = select_aspect(mode)?;
    let output_groups = plan.output_groups.join(",");
    let aspect = format!("{ASPECT_BASE}{}", plan.aspect);

    let mut event_file = EventFile::create(std::env::temp_dir().as_path())?;

    let mut cmd = Command::new("bazel");
    cmd.arg("build")
        .arg(format!("--aspects={aspect}"))
        .arg(format!("--output_groups={output_groups}"))
        .arg(format!("--build_event_binary_file={}", event_file.path().display()))
        .args(build_flags)
        .arg("--")
        .args(targets)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    debug!("bazel::driver: running {:?}", cmd);
    let status = cmd.status().context("error running bazel")?;
    if !status.success() {
        return Err(DriverError::BuildSystem(format!("build exited with {}", status)).into());
    }

    let bytes = event_file.read_all()?;
    trace!("bazel::driver: read {} bytes of build event stream", bytes.len());
    Ok(bytes)
}
