//! The graph stitcher. Materializes build-target records, stdlib records,
//! and source-parsed import edges into the final `PackageID -> Package`
//! map and root set, honoring the load-mode bitmask.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::trace;

use crate::aspect::{self, AspectRecord};
use crate::bazel;
use crate::context::RequestContext;
use crate::import_scan;
use crate::load_mode::LoadMode;
use crate::protocol::Package;
use crate::stdlib::{self, table};

/// Runs the full build-driver -> event-stream -> aspect-parser pipeline
/// for `build_targets`, then resolves `stdlib_patterns`, stitching both
/// into one package map.
pub fn build(
    ctx: &RequestContext,
    mode: LoadMode,
    build_targets: &[String],
    stdlib_patterns: &[String],
    build_flags: &[String],
) -> Result<(HashMap<String, Package>, HashSet<String>)> {
    let mut records = Vec::new();

    if !build_targets.is_empty() {
        let stream = bazel::build_aspects(mode, build_flags, build_targets)?;
        let files = bazel::extract_output_files(&stream, bazel::driver::DEFAULT_OUTPUT_GROUP)?;
        trace!("graph::build: {} aspect output file(s) to parse", files.len());

        for file in files {
            records.push(aspect::parse(Path::new(&file))?);
        }
    }

    build_from_records(ctx, mode, &records, stdlib_patterns)
}

/// The pure stitching half of [`build`], taking already-parsed aspect
/// records rather than driving `bazel` itself. Split out so the stitcher
/// can be exercised directly against fixture records, with no build-system
/// subprocess involved.
pub fn build_from_records(
    ctx: &RequestContext,
    mode: LoadMode,
    records: &[AspectRecord],
    stdlib_patterns: &[String],
) -> Result<(HashMap<String, Package>, HashSet<String>)> {
    let mut pkgs: HashMap<String, Package> = HashMap::new();
    let mut roots: HashSet<String> = HashSet::new();

    for record in records {
        if pkgs.contains_key(&record.id) {
            roots.insert(record.id.clone());
            continue;
        }

        let mut in_progress = HashSet::new();
        let pkg = build_package_for_record(ctx, mode, record, &mut pkgs, &mut in_progress)?;
        roots.insert(pkg.id.clone());
        pkgs.insert(pkg.id.clone(), pkg);
    }

    for pattern in stdlib_patterns {
        let label = table::label_for_import_path(pattern);
        if pkgs.contains_key(&label) {
            roots.insert(label);
            continue;
        }

        let mut in_progress = HashSet::new();
        let pkg = build_package_for_stdlib(ctx, mode, pattern, &mut pkgs, &mut in_progress)?;
        roots.insert(pkg.id.clone());
        pkgs.insert(pkg.id.clone(), pkg);
    }

    Ok((pkgs, roots))
}

fn materialize_from_aspect(ctx: &RequestContext, mode: LoadMode, record: &AspectRecord) -> Package {
    let mut pkg = Package {
        id: record.id.clone(),
        name: record.name.clone(),
        import_path: record.import_path.clone(),
        ..Package::default()
    };

    if mode.contains(LoadMode::FILES) {
        pkg.source_files = record.go_files.iter().map(|f| ctx.absolutize(f)).collect();
        pkg.other_files = record.other_files.iter().map(|f| ctx.absolutize(f)).collect();
    }
    if mode.contains(LoadMode::COMPILED_FILES) {
        pkg.compiled_files = record.compiled_go_files.iter().map(|f| ctx.absolutize(f)).collect();
    }
    if mode.contains(LoadMode::EXPORTS_FILE) {
        pkg.export_file = record.export_file.as_ref().map(|f| ctx.absolutize(f));
    }

    pkg
}

/// Strips a stdlib `Package` (always fully populated by `resolve_stdlib`)
/// back down to the fields the load mode actually asked for.
fn apply_mode_to_stdlib(mut pkg: Package, mode: LoadMode) -> Package {
    if !mode.contains(LoadMode::FILES) {
        pkg.source_files = Vec::new();
        pkg.other_files = Vec::new();
    }
    if !mode.contains(LoadMode::COMPILED_FILES) {
        pkg.compiled_files = Vec::new();
    }
    if !mode.contains(LoadMode::EXPORTS_FILE) {
        pkg.export_file = None;
    }
    pkg
}

fn build_package_for_record(
    ctx: &RequestContext,
    mode: LoadMode,
    record: &AspectRecord,
    pkgs: &mut HashMap<String, Package>,
    in_progress: &mut HashSet<String>,
) -> Result<Package> {
    let mut pkg = materialize_from_aspect(ctx, mode, record);
    let scan_sources: Vec<PathBuf> = record.go_files.iter().map(|f| ctx.absolutize(f)).collect();

    in_progress.insert(record.id.clone());
    if mode.wants_deps() {
        attach_full_imports(ctx, mode, Some(record), &scan_sources, &mut pkg, pkgs, in_progress)?;
    } else if mode.wants_imports() {
        attach_stub_imports(Some(record), &scan_sources, &mut pkg)?;
    }
    in_progress.remove(&record.id);

    Ok(pkg)
}

fn build_package_for_stdlib(
    ctx: &RequestContext,
    mode: LoadMode,
    import_path: &str,
    pkgs: &mut HashMap<String, Package>,
    in_progress: &mut HashSet<String>,
) -> Result<Package> {
    let full = stdlib::resolve_stdlib(ctx, import_path)?;
    let scan_sources = full.source_files.clone();
    let mut pkg = apply_mode_to_stdlib(full, mode);

    in_progress.insert(pkg.id.clone());
    if mode.wants_deps() {
        attach_full_imports(ctx, mode, None, &scan_sources, &mut pkg, pkgs, in_progress)?;
    } else if mode.wants_imports() {
        attach_stub_imports(None, &scan_sources, &mut pkg)?;
    }
    in_progress.remove(&pkg.id);

    Ok(pkg)
}

/// Attaches one fully materialized (or reused) descendant per discovered
/// import, from both the source scan and, when present, the aspect's own
/// nested dependency records.
fn attach_full_imports(
    ctx: &RequestContext,
    mode: LoadMode,
    record: Option<&AspectRecord>,
    scan_sources: &[PathBuf],
    pkg: &mut Package,
    pkgs: &mut HashMap<String, Package>,
    in_progress: &mut HashSet<String>,
) -> Result<()> {
    for file in scan_sources {
        for found in import_scan::scan_file(file)? {
            if let Some(existing) = pkgs.get(&found.label) {
                pkg.imports.insert(found.import_path, existing.clone());
                continue;
            }
            if in_progress.contains(&found.label) {
                pkg.imports.insert(found.import_path, Package::stub(found.label));
                continue;
            }

            let dep = build_package_for_stdlib(ctx, mode, &found.import_path, pkgs, in_progress)?;
            pkgs.insert(dep.id.clone(), dep.clone());
            pkg.imports.insert(found.import_path, dep);
        }
    }

    if let Some(record) = record {
        for (import_path, nested) in &record.imports {
            if let Some(existing) = pkgs.get(&nested.id) {
                pkg.imports.insert(import_path.clone(), existing.clone());
                continue;
            }
            if in_progress.contains(&nested.id) {
                pkg.imports.insert(import_path.clone(), Package::stub(nested.id.clone()));
                continue;
            }

            let dep = build_package_for_record(ctx, mode, nested, pkgs, in_progress)?;
            pkgs.insert(dep.id.clone(), dep.clone());
            pkg.imports.insert(import_path.clone(), dep);
        }
    }

    Ok(())
}

/// Attaches identity-only stubs, again from both the source scan and
/// (when present) the aspect's flat dependency map.
fn attach_stub_imports(record: Option<&AspectRecord>, scan_sources: &[PathBuf], pkg: &mut Package) -> Result<()> {
    for file in scan_sources {
        for found in import_scan::scan_file(file)? {
            pkg.imports.entry(found.import_path).or_insert_with(|| Package::stub(found.label));
        }
    }

    if let Some(record) = record {
        for (import_path, label) in &record.dep_importpaths_to_labels {
            pkg.imports.entry(import_path.clone()).or_insert_with(|| Package::stub(label.clone()));
        }
    }

    Ok(())
}
