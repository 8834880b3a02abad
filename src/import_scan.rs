//! An imports-only pass over a Go source file.
//!
//! This deliberately does not build a syntax tree — only enough of a scan to
//! recover the quoted import-path strings a `go/parser` "imports-only" mode
//! would return. Build-tag filtering is **not** applied: a file the build
//! system would have excluded by tag may be scanned here too, with no
//! effect beyond potentially over-reporting.
//!
//! Only stdlib import paths are returned, each paired with its synthetic
//! label. Non-stdlib imports are resolved from the build system's own
//! dependency edges instead (see `crate::graph::attach_full_imports`).

use std::fs;
use std::path::Path;

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DriverError;
use crate::stdlib::table;

/// A stdlib import discovered in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedImport {
    pub import_path: String,
    pub label: String,
}

lazy_static! {
    static ref IMPORT_BLOCK: Regex =
        Regex::new(r"(?s)import\s*\(((?:[^()]|\([^()]*\))*)\)").unwrap();
    static ref IMPORT_SINGLE: Regex = Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
    static ref QUOTED: Regex = Regex::new(r#""([^"]+)""#).unwrap();
}

/// Scans one source file and returns the stdlib imports it references, in
/// source order.
pub fn scan_file(path: &Path) -> Result<Vec<ScannedImport>> {
    let contents =
        fs::read_to_string(path).map_err(|source| DriverError::Io { path: path.to_owned(), source })?;
    Ok(scan_source(&contents))
}

fn scan_source(contents: &str) -> Vec<ScannedImport> {
    let mut found = Vec::new();

    for block in IMPORT_BLOCK.captures_iter(contents) {
        for quoted in QUOTED.captures_iter(&block[1]) {
            push_if_stdlib(&mut found, &quoted[1]);
        }
    }

    for single in IMPORT_SINGLE.captures_iter(contents) {
        push_if_stdlib(&mut found, &single[1]);
    }

    found
}

fn push_if_stdlib(found: &mut Vec<ScannedImport>, import_path: &str) {
    if table::is_stdlib_import_path(import_path)
        && !found.iter().any(|f| f.import_path == import_path)
    {
        found.push(ScannedImport {
            import_path: import_path.to_owned(),
            label: table::label_for_import_path(import_path),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_line_import() {
        let src = "package hello\n\nimport \"fmt\"\n\nfunc A() string { return fmt.Sprintf(\"x\") }\n";
        let found = scan_source(src);
        assert_eq!(found, vec![ScannedImport { import_path: "fmt".into(), label: "@go_sdk//:stdlib-fmt".into() }]);
    }

    #[test]
    fn finds_grouped_imports_and_ignores_non_stdlib() {
        let src = r#"
package goodbye

import (
    "fmt"
    "fakeimportpath/hello"
    "strings"
)
"#;
        let found = scan_source(src);
        assert_eq!(
            found,
            vec![
                ScannedImport { import_path: "fmt".into(), label: "@go_sdk//:stdlib-fmt".into() },
                ScannedImport { import_path: "strings".into(), label: "@go_sdk//:stdlib-strings".into() },
            ]
        );
    }

    #[test]
    fn deduplicates_repeated_import() {
        let src = "package p\nimport \"fmt\"\nimport \"fmt\"\n";
        assert_eq!(scan_source(src).len(), 1);
    }
}
