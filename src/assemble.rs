//! Linearizes the stitched graph into the canonical, sorted response.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::context::RequestContext;
use crate::load_mode::LoadMode;
use crate::protocol::{Package, Response, StdSizes};

/// Word size and alignment for the architectures this crate's fixtures and
/// tests exercise, mirroring `go/types.SizesFor("gc", GOARCH)`. Anything not
/// listed falls back to the 64-bit values, which holds for every
/// contemporary Bazel-supported Go architecture except 32-bit ARM/x86.
fn std_sizes_for(goarch: &str) -> StdSizes {
    match goarch {
        "386" | "arm" => StdSizes { word_size: 4, max_align: 4 },
        _ => StdSizes { word_size: 8, max_align: 8 },
    }
}

/// Produces the final wire response from the stitched package map and root
/// set.
pub fn assemble(
    ctx: &RequestContext,
    mode: LoadMode,
    mut pkgs: HashMap<String, Package>,
    roots: HashSet<String>,
) -> Response {
    // Every import-edge target must also appear in the top-level package
    // slice, even if it was only ever reached as someone's dependency stub
    // or full descendant.
    let mut missing: Vec<Package> = Vec::new();
    for pkg in pkgs.values() {
        for imported in pkg.imports.values() {
            if !pkgs.contains_key(&imported.id) {
                missing.push(imported.clone());
            }
        }
    }
    for pkg in missing {
        pkgs.entry(pkg.id.clone()).or_insert(pkg);
    }

    let packages: Vec<Package> = pkgs.into_values().sorted_by(|a, b| a.id.cmp(&b.id)).collect();
    let roots: Vec<String> = roots.into_iter().sorted().collect();

    let sizes = if mode.contains(LoadMode::TYPES_SIZES) { Some(std_sizes_for(&ctx.goarch)) } else { None };

    Response { sizes, roots, packages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx() -> RequestContext {
        RequestContext {
            exec_root: PathBuf::from("/exec"),
            pwd: PathBuf::from("/pwd"),
            goarch: "amd64".to_owned(),
            goos: "linux".to_owned(),
            goroot: PathBuf::from("/goroot"),
        }
    }

    #[test]
    fn sorts_packages_and_roots() {
        let mut pkgs = HashMap::new();
        pkgs.insert("//:hello".to_owned(), Package { id: "//:hello".into(), ..Package::default() });
        pkgs.insert("//:goodbye".to_owned(), Package { id: "//:goodbye".into(), ..Package::default() });
        let roots: HashSet<String> = ["//:hello".to_owned(), "//:goodbye".to_owned()].into_iter().collect();

        let resp = assemble(&ctx(), LoadMode::NAME, pkgs, roots);
        let ids: Vec<&str> = resp.packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["//:goodbye", "//:hello"]);
        assert_eq!(resp.roots, vec!["//:goodbye", "//:hello"]);
    }

    #[test]
    fn pulls_in_import_targets_missing_from_top_level() {
        let mut hello_use = Package { id: "//:hello_use".into(), ..Package::default() };
        hello_use.imports.insert("fakeimportpath/hello".into(), Package::stub("//:hello"));

        let mut pkgs = HashMap::new();
        pkgs.insert(hello_use.id.clone(), hello_use);
        let roots: HashSet<String> = ["//:hello_use".to_owned()].into_iter().collect();

        let resp = assemble(&ctx(), LoadMode::NAME | LoadMode::IMPORTS, pkgs, roots);
        assert!(resp.packages.iter().any(|p| p.id == "//:hello"));
    }

    #[test]
    fn populates_sizes_only_when_requested() {
        let resp = assemble(&ctx(), LoadMode::NAME, HashMap::new(), HashSet::new());
        assert!(resp.sizes.is_none());

        let resp = assemble(&ctx(), LoadMode::NAME | LoadMode::TYPES_SIZES, HashMap::new(), HashSet::new());
        assert_eq!(resp.sizes.unwrap().word_size, 8);
    }
}
