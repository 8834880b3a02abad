//! Synthesizes `Package` records for standard-library import paths by
//! inspecting the toolchain installation directory.

use anyhow::{Context, Result};
use log::trace;
use walkdir::WalkDir;

use crate::context::RequestContext;
use crate::protocol::Package;

use super::table;

const BUILTIN_IMPORT_PATH: &str = "builtin";

/// Resolves a standard-library import path into a `Package` with
/// `source_files`/`compiled_files` populated from `$GOROOT/src/<import_path>`
/// and `export_file` pointing at the toolchain's precompiled archive.
/// `imports` is left empty; the graph stitcher (`crate::graph`) fills it in
/// under `IMPORTS`/`DEPS` by scanning `source_files` with
/// `crate::import_scan`.
pub fn resolve_stdlib(ctx: &RequestContext, import_path: &str) -> Result<Package> {
    if import_path == BUILTIN_IMPORT_PATH {
        return Ok(builtin_package(ctx));
    }

    let id = table::label_for_import_path(import_path);
    let name = import_path.rsplit('/').next().unwrap_or(import_path).to_owned();

    let src_dir = ctx.goroot.join("src").join(import_path);
    trace!("stdlib::resolve_stdlib: listing {}", src_dir.display());

    let mut source_files = Vec::new();
    for entry in WalkDir::new(&src_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let file_name = entry.file_name().to_string_lossy();
        if file_name.ends_with(".go") && !file_name.ends_with("_test.go") {
            source_files.push(entry.path().to_path_buf());
        }
    }
    source_files.sort();

    let export_file = ctx
        .goroot
        .join("pkg")
        .join(format!("{}_{}", ctx.goos, ctx.goarch))
        .join(import_path)
        .with_extension("a");

    Ok(Package {
        id,
        name,
        import_path: import_path.to_owned(),
        compiled_files: source_files.clone(),
        source_files,
        other_files: Vec::new(),
        export_file: Some(export_file),
        imports: Default::default(),
    })
}

/// The pseudo-package `builtin` is handled as a dedicated case: it never
/// has compiled files or an export file, since it exists only to give the
/// type checker builtin identifiers' declarations, not code the compiler
/// actually emits.
fn builtin_package(ctx: &RequestContext) -> Package {
    let id = table::label_for_import_path(BUILTIN_IMPORT_PATH);
    Package {
        id,
        name: BUILTIN_IMPORT_PATH.to_owned(),
        import_path: BUILTIN_IMPORT_PATH.to_owned(),
        source_files: vec![ctx.goroot.join("src/builtin/builtin.go")],
        compiled_files: Vec::new(),
        other_files: Vec::new(),
        export_file: None,
        imports: Default::default(),
    }
}

pub fn must_find_goroot(ctx: &RequestContext) -> Result<()> {
    ctx.goroot
        .metadata()
        .with_context(|| format!("GOROOT {} does not exist", ctx.goroot.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_ctx() -> RequestContext {
        RequestContext {
            exec_root: PathBuf::from("/exec"),
            pwd: PathBuf::from("/pwd"),
            goarch: "amd64".to_owned(),
            goos: "linux".to_owned(),
            goroot: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/goroot")),
        }
    }

    #[test]
    fn builtin_is_special_cased() {
        let ctx = fixture_ctx();
        let pkg = resolve_stdlib(&ctx, "builtin").unwrap();
        assert_eq!(pkg.name, "builtin");
        assert!(pkg.compiled_files.is_empty());
        assert!(pkg.export_file.is_none());
        assert_eq!(pkg.source_files, vec![ctx.goroot.join("src/builtin/builtin.go")]);
    }

    #[test]
    fn stdlib_package_lists_go_files_excluding_tests() {
        let ctx = fixture_ctx();
        let pkg = resolve_stdlib(&ctx, "fmt").unwrap();
        assert_eq!(pkg.name, "fmt");
        assert_eq!(pkg.id, "@go_sdk//:stdlib-fmt");
        assert!(pkg.source_files.iter().all(|f| !f.to_string_lossy().ends_with("_test.go")));
        assert!(pkg.source_files.iter().any(|f| f.ends_with("print.go")));
    }
}
