//! Parses one aspect output file into an `AspectRecord`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde_derive::Deserialize;

use crate::error::DriverError;

/// Transient per-target metadata the build system's aspect writes to an
/// output file, one per built target.
#[derive(Debug, Clone, Deserialize)]
pub struct AspectRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "pkg_path")]
    pub import_path: String,
    #[serde(default)]
    pub go_files: Vec<String>,
    #[serde(default)]
    pub compiled_go_files: Vec<String>,
    #[serde(default)]
    pub other_files: Vec<String>,
    #[serde(default)]
    pub export_file: Option<String>,
    /// Populated by the shallow-export aspect variant: import path → label,
    /// attached by the graph stitcher as stub imports.
    #[serde(default)]
    pub dep_importpaths_to_labels: BTreeMap<String, String>,
    /// Populated only by the deep-export aspect variant: import path →
    /// nested record for the dependency, attached recursively by the graph
    /// stitcher.
    #[serde(default)]
    pub imports: BTreeMap<String, AspectRecord>,
}

/// Reads and deserializes one aspect output file.
pub fn parse(path: &Path) -> Result<AspectRecord> {
    let contents =
        fs::read_to_string(path).map_err(|source| DriverError::Io { path: path.to_owned(), source })?;
    let record = serde_json::from_str(&contents)
        .map_err(|e| DriverError::Parse(format!("malformed aspect record in {}: {}", path.display(), e)))?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shallow_record() {
        let json = r#"{
            "id": "//:hello",
            "name": "hello",
            "pkg_path": "fakeimportpath/hello",
            "go_files": ["hello.go"],
            "compiled_go_files": ["hello.go"],
            "export_file": "bazel-out/hello.x",
            "dep_importpaths_to_labels": {"fmt": "@go_sdk//:stdlib-fmt"}
        }"#;
        let record: AspectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "//:hello");
        assert_eq!(record.dep_importpaths_to_labels.get("fmt").unwrap(), "@go_sdk//:stdlib-fmt");
        assert!(record.imports.is_empty());
    }

    #[test]
    fn parses_nested_deep_record() {
        let json = r#"{
            "id": "//:hello_use",
            "name": "hello_use",
            "pkg_path": "fakeimportpath/hello_use",
            "imports": {
                "fakeimportpath/hello": {
                    "id": "//:hello",
                    "name": "hello",
                    "pkg_path": "fakeimportpath/hello"
                }
            }
        }"#;
        let record: AspectRecord = serde_json::from_str(json).unwrap();
        let nested = record.imports.get("fakeimportpath/hello").unwrap();
        assert_eq!(nested.id, "//:hello");
    }
}
