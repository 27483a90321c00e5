use crate::config::ExportConfig;
use crate::error::{Diagnostic, ExportError};
use crate::ir_map::IrMap;
use crate::writer::write_map_file;
use indexmap::IndexMap;
use std::path::Path;

/// A named export format the host can offer next to its own.
pub trait MapFormat {
    /// Display name.
    fn name(&self) -> &str;
    /// File extension, without the dot.
    fn extension(&self) -> &str;
    /// Writes `map` to `path`; nothing is left at `path` on error.
    fn write(&self, map: &IrMap, path: &Path) -> Result<Vec<Diagnostic>, ExportError>;
}

/// The `.dat` binary map format.
#[derive(Debug, Clone, Default)]
pub struct DatFormat {
    config: ExportConfig,
}

impl DatFormat {
    /// Format writing with `config`.
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Settings used for every write.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }
}

impl MapFormat for DatFormat {
    fn name(&self) -> &str {
        &self.config.format_name
    }

    fn extension(&self) -> &str {
        &self.config.extension
    }

    fn write(&self, map: &IrMap, path: &Path) -> Result<Vec<Diagnostic>, ExportError> {
        write_map_file(map, path, &self.config)
    }
}

/// Export formats keyed by file extension, in registration order.
#[derive(Default)]
pub struct FormatRegistry {
    formats: IndexMap<String, Box<dyn MapFormat>>,
}

impl FormatRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `.dat` format already registered.
    pub fn with_dat(config: ExportConfig) -> Self {
        let mut registry = Self::new();
        registry.register(DatFormat::new(config));
        registry
    }

    /// Registers `format` under its extension, replacing any previous
    /// format for the same extension.
    pub fn register(&mut self, format: impl MapFormat + 'static) -> Option<Box<dyn MapFormat>> {
        let ext = format.extension().to_ascii_lowercase();
        self.formats.insert(ext, Box::new(format))
    }

    /// Format for `extension`, case-insensitive.
    pub fn get(&self, extension: &str) -> Option<&dyn MapFormat> {
        self.formats
            .get(&extension.to_ascii_lowercase())
            .map(|f| f.as_ref())
    }

    /// Format matching the extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<&dyn MapFormat> {
        let ext = path.extension()?.to_str()?;
        self.get(ext)
    }

    /// All formats in registration order.
    pub fn formats(&self) -> impl Iterator<Item = &dyn MapFormat> {
        self.formats.values().map(|f| &**f as &dyn MapFormat)
    }
}
