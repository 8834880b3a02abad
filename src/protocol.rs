//! The wire format exchanged with `golang.org/x/tools/go/packages`. Field
//! names match the Go struct's exported field names exactly, since
//! `go/packages` has no JSON tags of its own and relies on Go's default
//! (capitalized) JSON encoding.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_derive::{Deserialize, Serialize};

use crate::load_mode::LoadMode;

/// Sent by `go/packages` on stdin. Only `mode` and `build_flags` are
/// consulted by the core; the rest are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub mode: LoadModeWire,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub build_flags: Vec<String>,
    #[serde(default)]
    pub tests: bool,
    #[serde(default)]
    pub overlay: BTreeMap<String, Vec<u8>>,
}

/// `LoadMode` deserializes from the plain integer bitmask the client sends.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadModeWire(pub LoadMode);

impl<'de> serde::Deserialize<'de> for LoadModeWire {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(LoadModeWire(LoadMode::from_bits_truncate(bits)))
    }
}

/// `types.StdSizes` from the Go standard library, used as the `Sizes` field
/// when the load mode includes `TYPES_SIZES`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StdSizes {
    #[serde(rename = "WordSize")]
    pub word_size: i64,
    #[serde(rename = "MaxAlign")]
    pub max_align: i64,
}

/// Emitted on stdout.
#[derive(Debug, Default, Serialize)]
pub struct Response {
    #[serde(rename = "Sizes", skip_serializing_if = "Option::is_none")]
    pub sizes: Option<StdSizes>,
    #[serde(rename = "Roots", skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<String>,
    #[serde(rename = "Packages")]
    pub packages: Vec<Package>,
}

/// The package descriptor returned to the client.
///
/// `imports` values are either fully-populated descendants or stubs
/// carrying only `id`, depending on the load mode in effect when they were
/// attached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Package {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "PkgPath", skip_serializing_if = "String::is_empty")]
    pub import_path: String,
    #[serde(rename = "GoFiles", skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<PathBuf>,
    #[serde(rename = "CompiledGoFiles", skip_serializing_if = "Vec::is_empty")]
    pub compiled_files: Vec<PathBuf>,
    #[serde(rename = "OtherFiles", skip_serializing_if = "Vec::is_empty")]
    pub other_files: Vec<PathBuf>,
    #[serde(rename = "ExportFile", skip_serializing_if = "Option::is_none")]
    pub export_file: Option<PathBuf>,
    #[serde(rename = "Imports", skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: BTreeMap<String, Package>,
}

impl Package {
    /// A stub carrying only an identity: what the graph stitcher attaches
    /// when the load mode requests `IMPORTS` but not `DEPS`.
    pub fn stub(id: impl Into<String>) -> Package {
        Package { id: id.into(), ..Package::default() }
    }
}
