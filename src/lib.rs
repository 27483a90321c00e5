#![warn(missing_docs)]

//! Tiled map exporter to a compact, little-endian `.dat` binary format.
//!
//! The exporter borrows a resolved map ([`IrMap`]) and writes, in order:
//! map properties, the used-tileset table (with tile animations), the
//! flattened layer count and one record per non-group layer. Tile layers
//! become dense `(tile_id, tileset_index)` grids, object layers become
//! rectangle/point/polygon records carrying their own properties.
//!
//! ```no_run
//! use tiled_dat_export::{decode_map_file_to_ir, write_map_file, ExportConfig};
//!
//! let (map, _dir) = decode_map_file_to_ir("res/maps/level1.json")?;
//! for warning in write_map_file(&map, "res/maps/level1.dat", &ExportConfig::default())? {
//!     eprintln!("{warning}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod format;
mod geom;
mod ir_map;
mod loader {
    pub mod json_loader;
}
pub mod writer;

pub use config::ExportConfig;
pub use error::{Diagnostic, ExportError, MapError};
pub use format::{DatFormat, FormatRegistry, MapFormat};
pub use geom::{vec2, Vec2};
pub use ir_map::{
    CellRef, IrFrame, IrLayer, IrLayerKind, IrMap, IrObject, IrTile, IrTileset, ObjectShape,
    Properties, PropertyValue, TilesetId,
};
pub use loader::json_loader::{decode_map_file_to_ir, decode_map_str_to_ir};
pub use writer::layer::{count_layers, flatten_layers};
pub use writer::tileset::rooted_image_path;
pub use writer::{encode_map, encode_map_to, write_map_file, ExportReport, WriteTiledMap};
