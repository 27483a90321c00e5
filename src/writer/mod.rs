//! `.dat` map writer.
//!
//! Layout, all integers little-endian, counts `u32`:
//!
//! ```text
//! Properties                map properties
//! u32 tileset_count         Tileset[tileset_count]
//! u32 layer_count           flattened, groups excluded
//! Layer[layer_count]
//! ```
//!
//! See [`properties`], [`tileset`], [`layer`] and [`object`] for the
//! record layouts.

pub mod layer;
pub mod object;
pub mod primitive;
pub mod properties;
pub mod tileset;

use crate::config::ExportConfig;
use crate::error::{Diagnostic, ExportError};
use crate::ir_map::{IrMap, TilesetId};
use byteorder::{WriteBytesExt, LE};
use primitive::WriteDat;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Traversal state of one encode call.
pub(crate) struct EncodeState<'a> {
    pub(crate) config: &'a ExportConfig,
    /// Used tilesets; a cell's tileset index is its position in here.
    pub(crate) used_tilesets: Vec<TilesetId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> EncodeState<'a> {
    fn new(map: &IrMap, config: &'a ExportConfig) -> Self {
        Self {
            config,
            used_tilesets: map.used_tilesets(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Output of a successful in-memory encode.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// The complete `.dat` file.
    pub bytes: Vec<u8>,
    /// Non-fatal problems, in the order they were met.
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for writing an [`IrMap`] to a stream in the `.dat` layout.
///
/// # Partial Writes
/// A failed call may leave some bytes in the stream. Use [`encode_map`]
/// or [`write_map_file`] when nothing may be committed on failure.
pub trait WriteTiledMap: Write {
    /// Writes the whole map and returns the non-fatal diagnostics.
    fn write_tiled_map(
        &mut self,
        map: &IrMap,
        config: &ExportConfig,
    ) -> Result<Vec<Diagnostic>, ExportError> {
        let mut state = EncodeState::new(map, config);

        properties::write_properties(self, &map.properties, properties::Owner::Map, &mut state)?;

        self.write_len("tileset table", state.used_tilesets.len())?;
        debug!("[tileset_count] = {}", state.used_tilesets.len());
        for &id in &state.used_tilesets {
            let ts = map
                .tileset(id)
                .ok_or_else(|| layer::unknown_tileset(map, id))?;
            tileset::write_tileset(self, ts, &state)?;
        }

        let layer_count = layer::count_layers(&map.layers);
        self.write_len("layer table", layer_count)?;
        debug!("[layer_count] = {}", layer_count);
        layer::write_layers(self, map, &mut state)?;

        self.flush()?;
        Ok(state.diagnostics)
    }
}

impl<W: Write + ?Sized> WriteTiledMap for W {}

/// Encodes `map` into a fresh buffer.
pub fn encode_map(map: &IrMap, config: &ExportConfig) -> Result<ExportReport, ExportError> {
    let mut bytes = Vec::new();
    let diagnostics = bytes.write_tiled_map(map, config)?;
    Ok(ExportReport { bytes, diagnostics })
}

/// Encodes `map` into `w`. See [`WriteTiledMap`] about partial writes.
pub fn encode_map_to<W: Write>(
    w: &mut W,
    map: &IrMap,
    config: &ExportConfig,
) -> Result<Vec<Diagnostic>, ExportError> {
    w.write_tiled_map(map, config)
}

/// Encodes `map` and commits it to `path` atomically.
///
/// The file is staged next to `path` and renamed over it only once every
/// byte is written and synced; on any error `path` is left untouched.
pub fn write_map_file(
    map: &IrMap,
    path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<Vec<Diagnostic>, ExportError> {
    let path = path.as_ref();
    let report = encode_map(map, config)?;

    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(&report.bytes).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;

    info!(
        "Wrote {} bytes to {:?} ({} diagnostics)",
        report.bytes.len(),
        path,
        report.diagnostics.len()
    );
    Ok(report.diagnostics)
}

/// Shared by the record writers for the `i32` kind/shape/type tags.
#[inline]
pub(crate) fn write_tag<W: Write + ?Sized>(w: &mut W, tag: i32) -> Result<(), ExportError> {
    w.write_i32::<LE>(tag)?;
    Ok(())
}
