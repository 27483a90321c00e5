// src/ir_map.rs
use crate::geom::Vec2;
use indexmap::{IndexMap, IndexSet};

/// Canonical, format-agnostic map as handed over by the host.
///
/// Everything in here is already resolved: properties are flattened,
/// tile cells point at `(tileset, local id)` and image paths are the
/// host's full paths. The writer only ever borrows it.
#[derive(Debug, Clone, Default)]
pub struct IrMap {
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Map-level custom properties.
    pub properties: Properties,
    /// Every tileset the host owns; cells index into this.
    pub tilesets: Vec<IrTileset>,
    /// Top-level layers in draw order.
    pub layers: Vec<IrLayer>,
}

/// Index into [`IrMap::tilesets`]. Host-side identity only, never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilesetId(pub usize);

/// A tileset the host owns, used or not.
#[derive(Debug, Clone, Default)]
pub struct IrTileset {
    /// Tileset name as shown in the editor.
    pub name: String,
    /// Resolved image path, `None` for image-collection tilesets.
    pub image: Option<String>,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Number of tiles.
    pub tilecount: u32,
    /// Tileset-level custom properties.
    pub properties: Properties,
    /// Tiles that carry metadata; tiles without any are not listed.
    pub tiles: Vec<IrTile>,
}

/// Per-tile metadata.
#[derive(Debug, Clone, Default)]
pub struct IrTile {
    /// Local id within the tileset.
    pub id: u32,
    /// Tile-level custom properties.
    pub properties: Properties,
    /// Playback order. Empty when the tile is not animated.
    pub frames: Vec<IrFrame>,
}

impl IrTile {
    /// True when the tile has at least one frame.
    #[inline]
    pub fn is_animated(&self) -> bool {
        !self.frames.is_empty()
    }
}

/// One animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrFrame {
    /// Local id of the tile shown during this frame.
    pub tile_id: u32,
    /// Display time in milliseconds.
    pub duration_ms: u32,
}

/// A populated tile cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Owning tileset.
    pub tileset: TilesetId,
    /// Local id within `tileset`.
    pub tile_id: u32,
}

/// What a layer holds.
#[derive(Debug, Clone)]
pub enum IrLayerKind {
    /// Contributes no record of its own, only its descendants.
    Group {
        /// Children in draw order.
        layers: Vec<IrLayer>,
    },
    /// Dense tile grid.
    Tiles {
        /// Width in cells.
        width: usize,
        /// Height in cells.
        height: usize,
        /// Row-major, `None` = no tile.
        cells: Vec<Option<CellRef>>,
    },
    /// Free-standing objects.
    Objects {
        /// Objects in editor order.
        objects: Vec<IrObject>,
    },
    /// Any layer kind the writer has no layout for (image layers, ...).
    Unsupported {
        /// Host name of the layer type.
        kind: String,
    },
}

/// A layer and, for groups, the subtree below it.
#[derive(Debug, Clone)]
pub struct IrLayer {
    /// Layer name.
    pub name: String,
    /// Layer-level custom properties.
    pub properties: Properties,
    /// Payload.
    pub kind: IrLayerKind,
}

impl IrLayer {
    /// Layer with no properties.
    pub fn new(name: impl Into<String>, kind: IrLayerKind) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
            kind,
        }
    }

    /// True for group layers.
    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, IrLayerKind::Group { .. })
    }

    /// Cell at `(x, y)`, `None` when empty or out of bounds.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<CellRef> {
        match &self.kind {
            IrLayerKind::Tiles {
                width,
                height,
                cells,
            } if x < *width && y < *height => cells.get(y * width + x).copied().flatten(),
            _ => None,
        }
    }
}

impl Drop for IrLayer {
    // Unlinks nested groups onto a work list so dropping a deep tree does
    // not recurse once per level.
    fn drop(&mut self) {
        let IrLayerKind::Group { layers } = &mut self.kind else {
            return;
        };
        let mut pending = std::mem::take(layers);
        while let Some(mut layer) = pending.pop() {
            if let IrLayerKind::Group { layers } = &mut layer.kind {
                pending.append(layers);
            }
        }
    }
}

/// A map object. Geometry is classified by [`IrObject::shape`].
#[derive(Debug, Clone, Default)]
pub struct IrObject {
    /// Editor id, unique within the map.
    pub id: u32,
    /// Object name.
    pub name: String,
    /// Free-form type string (`class` in newer Tiled versions).
    pub class_name: String,
    /// Anchor x.
    pub x: f32,
    /// Anchor y.
    pub y: f32,
    /// Width, `0` for points.
    pub width: f32,
    /// Height, `0` for points.
    pub height: f32,
    /// Vertices relative to the anchor.
    pub polygon: Vec<Vec2>,
    /// Object-level custom properties.
    pub properties: Properties,
}

/// Geometry of an object, with polygon vertices in absolute coordinates.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ObjectShape {
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Point {
        x: f32,
        y: f32,
    },
    Polygon(Vec<Vec2>),
}

impl IrObject {
    /// `(x, y)` as a vector.
    #[inline]
    pub fn anchor(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Classify the geometry: any vertex makes a polygon, a zero-sized
    /// object is a point, everything else is a rectangle.
    pub fn shape(&self) -> ObjectShape {
        if !self.polygon.is_empty() {
            let anchor = self.anchor();
            ObjectShape::Polygon(self.polygon.iter().map(|&p| anchor + p).collect())
        } else if self.width == 0.0 && self.height == 0.0 {
            ObjectShape::Point {
                x: self.x,
                y: self.y,
            }
        } else {
            ObjectShape::Rectangle {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            }
        }
    }
}

/// A resolved custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`.
    Bool(bool),
    /// `int` and `float`.
    Number(f64),
    /// `string`.
    String(String),
    /// A host type with no binary layout (color, file, object, class ...).
    Unsupported {
        /// Host type name.
        kind: String,
    },
}

/// Resolved properties in the host's enumeration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(IndexMap<String, PropertyValue>);

#[allow(missing_docs)]
impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        self.0.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(PropertyValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(PropertyValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PropertyValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IrMap {
    /// Tilesets referenced by at least one tile cell, in the order they
    /// are first met walking layers depth-first and cells row-major.
    pub fn used_tilesets(&self) -> Vec<TilesetId> {
        let mut seen = IndexSet::new();
        let mut stack: Vec<&IrLayer> = self.layers.iter().rev().collect();

        while let Some(layer) = stack.pop() {
            match &layer.kind {
                IrLayerKind::Group { layers } => stack.extend(layers.iter().rev()),
                IrLayerKind::Tiles { cells, .. } => {
                    seen.extend(cells.iter().flatten().map(|c| c.tileset));
                }
                IrLayerKind::Objects { .. } | IrLayerKind::Unsupported { .. } => {}
            }
        }

        seen.into_iter().collect()
    }

    /// Tileset owned under `id`.
    pub fn tileset(&self, id: TilesetId) -> Option<&IrTileset> {
        self.tilesets.get(id.0)
    }
}
