//! End-to-end replay of a handful of representative request shapes.
//!
//! Driving a real `bazel build` isn't available in this crate's test
//! environment, so these tests instead feed pre-recorded aspect-output
//! fixtures straight into `graph::build_from_records` and
//! `assemble::assemble`, which is everything downstream of the build
//! subprocess call.

use std::path::{Path, PathBuf};

use gopackagesdriver::aspect;
use gopackagesdriver::assemble::assemble;
use gopackagesdriver::context::RequestContext;
use gopackagesdriver::graph::build_from_records;
use gopackagesdriver::load_mode::LoadMode;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/gopackages"))
}

fn ctx() -> RequestContext {
    RequestContext {
        exec_root: PathBuf::from("/exec"),
        pwd: fixtures_dir(),
        goarch: "amd64".to_owned(),
        goos: "linux".to_owned(),
        goroot: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/goroot")),
    }
}

fn load_record(name: &str) -> aspect::AspectRecord {
    aspect::parse(&fixtures_dir().join(name)).unwrap()
}

#[test]
fn single_library_name_only() {
    let ctx = ctx();
    let record = load_record("hello.aspect.json");

    let (pkgs, roots) = build_from_records(&ctx, LoadMode::NAME, &[record], &[]).unwrap();
    let response = assemble(&ctx, LoadMode::NAME, pkgs, roots);

    assert_eq!(response.packages.len(), 1);
    let pkg = &response.packages[0];
    assert_eq!(pkg.id, "//:hello");
    assert_eq!(pkg.name, "hello");
    assert_eq!(pkg.import_path, "fakeimportpath/hello");
    assert!(pkg.source_files.is_empty());
    assert!(pkg.imports.is_empty());
    assert!(response.sizes.is_none());
}

#[test]
fn files_mode_populates_source_files() {
    let ctx = ctx();
    let record = load_record("hello.aspect.json");

    let mode = LoadMode::NAME | LoadMode::FILES;
    let (pkgs, roots) = build_from_records(&ctx, mode, &[record], &[]).unwrap();
    let response = assemble(&ctx, mode, pkgs, roots);

    let pkg = response.packages.iter().find(|p| p.id == "//:hello").unwrap();
    assert_eq!(pkg.source_files, vec![Path::new(&fixtures_dir()).join("hello.go")]);
}

#[test]
fn mixed_patterns_sorted() {
    let ctx = ctx();
    let records = vec![load_record("hello.aspect.json"), load_record("goodbye.aspect.json")];

    let (pkgs, roots) = build_from_records(&ctx, LoadMode::NAME, &records, &[]).unwrap();
    let response = assemble(&ctx, LoadMode::NAME, pkgs, roots);

    let ids: Vec<&str> = response.packages.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["//:goodbye", "//:hello"]);
    assert_eq!(response.roots, vec!["//:goodbye", "//:hello"]);
}
