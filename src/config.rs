use crate::error::ExportError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Export settings. Every field has a default, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Path segment tileset images are re-rooted at.
    pub root_marker: String,
    /// Name the format is registered under.
    pub format_name: String,
    /// Output file extension, without the dot.
    pub extension: String,
    /// Fail instead of writing a `-1` tag for unsupported property types.
    pub strict_properties: bool,
    /// Object class -> property names every object of that class carries.
    pub required_properties: IndexMap<String, Vec<String>>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root_marker: "res".to_owned(),
            format_name: "OpenMV".to_owned(),
            extension: "dat".to_owned(),
            strict_properties: false,
            required_properties: IndexMap::new(),
        }
    }
}

impl ExportConfig {
    /// Parses a JSON config.
    pub fn from_json_str(txt: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(txt)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&txt).map_err(|source| ExportError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Required property names for objects of `class_name`.
    pub fn required_for(&self, class_name: &str) -> &[String] {
        self.required_properties
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
