use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Errors raised while building an [`IrMap`](crate::IrMap) from a Tiled JSON map.
#[derive(Debug, Error)]
pub enum MapError {
    /// A map or tileset file could not be read.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A map or tileset file is not valid JSON for its schema.
    #[error("Failed to parse JSON in {path:?}: {source}")]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Structurally valid JSON describing something unsupported or inconsistent.
    #[error("Invalid map: {0}")]
    InvalidMap(String),
    /// A tile cell names a gid no tileset covers.
    #[error("Layer '{layer}' references gid {gid}, highest known gid is {max_gid}")]
    InvalidTileGid {
        /// Layer holding the cell.
        layer: String,
        /// Gid with flip flags stripped.
        gid: u32,
        /// Last gid any tileset covers.
        max_gid: u32,
    },
    /// A tile object names a gid no tileset covers.
    #[error("Object {object_id} in layer '{layer}' references gid {gid}, highest known gid is {max_gid}")]
    InvalidObjectGid {
        /// Layer holding the object.
        layer: String,
        /// Editor id of the object.
        object_id: u32,
        /// Gid with flip flags stripped.
        gid: u32,
        /// Last gid any tileset covers.
        max_gid: u32,
    },
}

/// Fatal export errors. Nothing is committed when one of these is returned.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A used tileset's image path has no root marker segment, or no image.
    #[error("Image path {path:?} of tileset '{tileset}' has no '{marker}' segment")]
    UnresolvablePathRoot {
        /// Tileset name.
        tileset: String,
        /// Image path as the host gave it, empty when there is none.
        path: String,
        /// Configured root marker.
        marker: String,
    },
    /// A count or string length does not fit its `u32` prefix.
    #[error("{what} has {len} elements, more than a u32 length prefix can hold")]
    TooManyValues {
        /// What was being counted.
        what: String,
        /// Actual length.
        len: usize,
    },
    /// A tile id does not fit the `i16` cell field.
    #[error("Tile id {tile_id} at ({x}, {y}) in layer '{layer}' does not fit in an i16")]
    TileIdOutOfRange {
        /// Layer holding the cell.
        layer: String,
        /// Cell column.
        x: usize,
        /// Cell row.
        y: usize,
        /// Offending local id.
        tile_id: u32,
    },
    /// More used tilesets than the `i16` cell field can index.
    #[error("Layer '{layer}' needs tileset index {index}, which does not fit in an i16")]
    TilesetIndexOutOfRange {
        /// Layer holding the cell.
        layer: String,
        /// Offending used-tileset index.
        index: usize,
    },
    /// A cell names a tileset the map does not own.
    #[error("Cell ({x}, {y}) in layer '{layer}' references unknown tileset #{tileset}")]
    UnknownTileset {
        /// Layer holding the first such cell.
        layer: String,
        /// Cell column.
        x: usize,
        /// Cell row.
        y: usize,
        /// Missing tileset index.
        tileset: usize,
    },
    /// An unsupported property type under `strict_properties`.
    #[error("Property '{name}' on {owner} has unsupported type '{kind}'")]
    UnsupportedProperty {
        /// Map, layer or object carrying the property.
        owner: String,
        /// Property name.
        name: String,
        /// Host type name.
        kind: String,
    },
    /// The output file could not be staged, written or committed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// An export config file is not valid JSON for [`ExportConfig`](crate::ExportConfig).
    #[error("Invalid export config {path:?}: {source}")]
    Config {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The output stream rejected a write.
    #[error("Write to output sink failed: {0}")]
    Sink(#[from] io::Error),
}

/// Non-fatal problems found while encoding. The output is still produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Written as type tag `-1` with no payload.
    UnsupportedPropertyType {
        /// Map, layer or object carrying the property.
        owner: String,
        /// Property name.
        name: String,
        /// Host type name.
        kind: String,
    },
    /// The object record is written with whatever is available.
    MissingRequiredProperty {
        /// Object description.
        owner: String,
        /// Missing property name.
        name: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedPropertyType { owner, name, kind } => write!(
                f,
                "Property '{}' on {} has unsupported type '{}', written without a value",
                name, owner, kind
            ),
            Diagnostic::MissingRequiredProperty { owner, name } => {
                write!(f, "{} is missing required property '{}'", owner, name)
            }
        }
    }
}
