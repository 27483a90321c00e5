//! Tileset record:
//!
//! ```text
//! string name, string image_path
//! u32 tile_count, u32 tile_width, u32 tile_height
//! u32 animation_count
//! (u32 frame_count, u32 tile_id, (u32 source_tile_id, u32 duration_ms)[frame_count])[animation_count]
//! ```

use super::{primitive::WriteDat, EncodeState};
use crate::error::ExportError;
use crate::ir_map::IrTileset;
use byteorder::{WriteBytesExt, LE};
use std::io::Write;
use tracing::debug;

/// Re-roots `path` at the last component equal to `marker`.
///
/// Both `/` and `\` separate components; the result always uses `/`.
/// `None` when no component matches.
pub fn rooted_image_path(path: &str, marker: &str) -> Option<String> {
    let parts: Vec<&str> = path.split(['/', '\\']).collect();
    let start = parts.iter().rposition(|p| *p == marker)?;
    Some(parts[start..].join("/"))
}

pub(crate) fn write_tileset<W: Write + ?Sized>(
    w: &mut W,
    ts: &IrTileset,
    state: &EncodeState<'_>,
) -> Result<(), ExportError> {
    let marker = state.config.root_marker.as_str();
    let unresolvable = |path: &str| ExportError::UnresolvablePathRoot {
        tileset: ts.name.clone(),
        path: path.to_owned(),
        marker: marker.to_owned(),
    };
    let image = ts.image.as_deref().ok_or_else(|| unresolvable(""))?;
    let image_path = rooted_image_path(image, marker).ok_or_else(|| unresolvable(image))?;

    w.write_dat_string(&ts.name)?;
    w.write_dat_string(&image_path)?;
    w.write_u32::<LE>(ts.tilecount)?;
    w.write_u32::<LE>(ts.tile_w)?;
    w.write_u32::<LE>(ts.tile_h)?;

    let animated: Vec<_> = ts.tiles.iter().filter(|t| t.is_animated()).collect();
    w.write_len("animation table", animated.len())?;
    debug!(
        "[tileset] '{}' -> {} ({} animations)",
        ts.name,
        image_path,
        animated.len()
    );

    for tile in animated {
        w.write_len("animation", tile.frames.len())?;
        w.write_u32::<LE>(tile.id)?;
        for frame in &tile.frames {
            w.write_u32::<LE>(frame.tile_id)?;
            w.write_u32::<LE>(frame.duration_ms)?;
        }
    }

    Ok(())
}
