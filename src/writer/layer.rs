//! Layer record:
//!
//! ```text
//! string name, Properties, i32 kind
//!     kind  0 = tiles:   u32 width, u32 height, (i16 tile_id, i16 tileset_index)[width*height]
//!     kind  1 = objects: u32 object_count, Object[object_count]
//!     kind -1 = unknown: nothing
//! ```
//!
//! Groups produce no record; their children are written in place,
//! depth-first, left to right.

use super::object::write_object;
use super::properties::{write_properties, Owner};
use super::{primitive::WriteDat, write_tag, EncodeState};
use crate::error::ExportError;
use crate::ir_map::{CellRef, IrLayer, IrLayerKind, IrMap, TilesetId};
use byteorder::{WriteBytesExt, LE};
use std::io::Write;
use tracing::debug;

/// Tile id written for an empty cell.
pub const EMPTY_TILE_ID: i16 = -1;

/// Layer kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LayerKind {
    /// Tile grid.
    Tiles = 0,
    /// Object list.
    Objects = 1,
    /// No payload follows.
    Unknown = -1,
}

/// Leaf layers in write order, groups expanded in place.
pub fn flatten_layers<'a>(layers: &'a [IrLayer]) -> impl Iterator<Item = &'a IrLayer> + 'a {
    let mut stack: Vec<&IrLayer> = layers.iter().rev().collect();
    std::iter::from_fn(move || {
        while let Some(layer) = stack.pop() {
            match &layer.kind {
                IrLayerKind::Group { layers } => stack.extend(layers.iter().rev()),
                _ => return Some(layer),
            }
        }
        None
    })
}

/// Number of records [`write_layers`] emits, groups excluded.
pub fn count_layers(layers: &[IrLayer]) -> usize {
    flatten_layers(layers).count()
}

pub(crate) fn write_layers<W: Write + ?Sized>(
    w: &mut W,
    map: &IrMap,
    state: &mut EncodeState<'_>,
) -> Result<(), ExportError> {
    for layer in flatten_layers(&map.layers) {
        write_layer(w, layer, map, state)?;
    }
    Ok(())
}

fn write_layer<W: Write + ?Sized>(
    w: &mut W,
    layer: &IrLayer,
    map: &IrMap,
    state: &mut EncodeState<'_>,
) -> Result<(), ExportError> {
    w.write_dat_string(&layer.name)?;
    write_properties(w, &layer.properties, Owner::Layer(&layer.name), state)?;

    match &layer.kind {
        IrLayerKind::Tiles { width, height, .. } => {
            debug!("[layer] '{}': tiles {}x{}", layer.name, width, height);
            write_tag(w, LayerKind::Tiles as i32)?;
            write_tile_grid(w, layer, *width, *height, map, state)
        }
        IrLayerKind::Objects { objects } => {
            debug!("[layer] '{}': {} objects", layer.name, objects.len());
            write_tag(w, LayerKind::Objects as i32)?;
            w.write_len("object layer", objects.len())?;
            for obj in objects {
                write_object(w, obj, &layer.name, state)?;
            }
            Ok(())
        }
        IrLayerKind::Unsupported { kind } => {
            debug!("[layer] '{}': unknown kind '{}'", layer.name, kind);
            write_tag(w, LayerKind::Unknown as i32)
        }
        IrLayerKind::Group { .. } => unreachable!("flatten_layers never yields groups"),
    }
}

fn write_tile_grid<W: Write + ?Sized>(
    w: &mut W,
    layer: &IrLayer,
    width: usize,
    height: usize,
    map: &IrMap,
    state: &EncodeState<'_>,
) -> Result<(), ExportError> {
    w.write_len("layer width", width)?;
    w.write_len("layer height", height)?;

    for y in 0..height {
        for x in 0..width {
            let (tile_id, tileset_index) = match layer.cell_at(x, y) {
                Some(cell) => encode_cell(cell, layer, x, y, map, state)?,
                None => (EMPTY_TILE_ID, 0),
            };
            w.write_i16::<LE>(tile_id)?;
            w.write_i16::<LE>(tileset_index)?;
        }
    }
    Ok(())
}

fn encode_cell(
    cell: CellRef,
    layer: &IrLayer,
    x: usize,
    y: usize,
    map: &IrMap,
    state: &EncodeState<'_>,
) -> Result<(i16, i16), ExportError> {
    let unknown = || ExportError::UnknownTileset {
        layer: layer.name.clone(),
        x,
        y,
        tileset: cell.tileset.0,
    };
    if map.tileset(cell.tileset).is_none() {
        return Err(unknown());
    }
    let index = state
        .used_tilesets
        .iter()
        .position(|&t| t == cell.tileset)
        .ok_or_else(unknown)?;

    let tile_id = i16::try_from(cell.tile_id).map_err(|_| ExportError::TileIdOutOfRange {
        layer: layer.name.clone(),
        x,
        y,
        tile_id: cell.tile_id,
    })?;
    let tileset_index = i16::try_from(index).map_err(|_| ExportError::TilesetIndexOutOfRange {
        layer: layer.name.clone(),
        index,
    })?;
    Ok((tile_id, tileset_index))
}

/// Error for the first cell that names `tileset` when the map does not own it.
pub(crate) fn unknown_tileset(map: &IrMap, tileset: TilesetId) -> ExportError {
    for layer in flatten_layers(&map.layers) {
        if let IrLayerKind::Tiles { width, cells, .. } = &layer.kind {
            let hit = cells
                .iter()
                .position(|c| matches!(c, Some(c) if c.tileset == tileset));
            if let Some(idx) = hit {
                return ExportError::UnknownTileset {
                    layer: layer.name.clone(),
                    x: idx % (*width).max(1),
                    y: idx / (*width).max(1),
                    tileset: tileset.0,
                };
            }
        }
    }
    ExportError::UnknownTileset {
        layer: String::new(),
        x: 0,
        y: 0,
        tileset: tileset.0,
    }
}
