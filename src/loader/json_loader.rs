// src/loader/json_loader.rs
use crate::error::MapError;
use crate::geom::vec2;
use crate::ir_map::*;
use normalize_path::NormalizePath;
use serde::Deserialize;
use serde_json::{Map as JsonObjectMap, Value as JsonValue};
use std::path::{Path, PathBuf};

/// Strips the flip flags (bits 31..29) off a raw gid.
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits (bit 28 is free)

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer", "objectgroup", "group", ...
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    objects: Vec<JsonObject>,
    #[serde(default)]
    layers: Vec<JsonLayer>,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    /// Embedded tileset fields when there is no `source`.
    #[serde(flatten)]
    inline: JsonObjectMap<String, JsonValue>,
}

#[derive(Deserialize)]
struct JsonMap {
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    infinite: bool,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    polygon: Vec<JsonObjectPoint>,
    #[serde(default)]
    polyline: Vec<JsonObjectPoint>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    animation: Vec<JsonFrame>,
}

#[derive(Deserialize)]
struct JsonFrame {
    tileid: u32,
    duration: u32,
}

fn json_property_to_ir(prop: JsonProperty) -> Result<(String, PropertyValue), MapError> {
    let JsonProperty { name, kind, value } = prop;

    let mismatch = |expected: &str| {
        MapError::InvalidMap(format!(
            "Property '{name}' is declared {expected} but holds {value}"
        ))
    };

    let parsed = match kind.as_deref() {
        Some("bool") => PropertyValue::Bool(value.as_bool().ok_or_else(|| mismatch("bool"))?),
        Some("int") | Some("float") => {
            PropertyValue::Number(value.as_f64().ok_or_else(|| mismatch("numeric"))?)
        }
        Some("string") => PropertyValue::String(
            value
                .as_str()
                .ok_or_else(|| mismatch("string"))?
                .to_owned(),
        ),
        Some(other) => PropertyValue::Unsupported {
            kind: other.to_owned(),
        },
        None => match &value {
            JsonValue::Bool(v) => PropertyValue::Bool(*v),
            JsonValue::Number(n) => PropertyValue::Number(n.as_f64().unwrap_or_default()),
            JsonValue::String(s) => PropertyValue::String(s.clone()),
            _ => PropertyValue::Unsupported {
                kind: "json".to_owned(),
            },
        },
    };

    Ok((name, parsed))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    props.into_iter().map(json_property_to_ir).collect()
}

/// Maps global tile ids to `(tileset, local id)`.
struct GidResolver {
    ranges: Vec<(u32, u32, TilesetId)>, // (first_gid, tilecount, tileset), sorted
}

impl GidResolver {
    fn new(tilesets: &[(u32, &IrTileset)]) -> Self {
        let mut ranges: Vec<_> = tilesets
            .iter()
            .enumerate()
            .map(|(i, (first_gid, ts))| (*first_gid, ts.tilecount, TilesetId(i)))
            .collect();
        ranges.sort_unstable_by_key(|r| r.0);
        Self { ranges }
    }

    fn max_gid(&self) -> u32 {
        self.ranges
            .iter()
            .map(|(first, count, _)| first.saturating_add(*count).saturating_sub(1))
            .max()
            .unwrap_or(0)
    }

    /// `Ok(None)` for gid 0, `Err(gid)` for a gid no tileset covers.
    fn resolve(&self, raw_gid: u32) -> Result<Option<CellRef>, u32> {
        let gid = raw_gid & GID_MASK;
        if gid == 0 {
            return Ok(None);
        }
        let idx = self.ranges.partition_point(|r| r.0 <= gid);
        let Some(&(first, count, tileset)) = idx.checked_sub(1).and_then(|i| self.ranges.get(i))
        else {
            return Err(gid);
        };
        let tile_id = gid - first;
        if tile_id >= count {
            return Err(gid);
        }
        Ok(Some(CellRef { tileset, tile_id }))
    }
}

fn object_to_ir(obj: JsonObject) -> Result<IrObject, MapError> {
    // Polylines share the polygon vertex list.
    let points = if !obj.polygon.is_empty() {
        obj.polygon
    } else {
        obj.polyline
    };

    let class_name = if !obj.class.is_empty() {
        obj.class
    } else {
        obj.kind
    };

    Ok(IrObject {
        id: obj.id,
        name: obj.name,
        class_name,
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        polygon: points.into_iter().map(|p| vec2(p.x, p.y)).collect(),
        properties: properties_from_json(obj.properties)?,
    })
}

fn layer_to_ir(l: JsonLayer, gids: &GidResolver) -> Result<IrLayer, MapError> {
    let properties = properties_from_json(l.properties)?;
    let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
        "tilelayer" => {
            if let Some(enc) = l.encoding.as_deref().filter(|e| *e != "csv") {
                return Err(MapError::InvalidMap(format!(
                    "Layer '{}' uses '{}' encoding, only CSV/array data is supported",
                    l.name, enc
                )));
            }
            if l.data.len() != l.width * l.height {
                return Err(MapError::InvalidMap(format!(
                    "Layer '{}' has {} cells, expected {}x{}",
                    l.name,
                    l.data.len(),
                    l.width,
                    l.height
                )));
            }
            let cells = l
                .data
                .iter()
                .map(|&raw| {
                    gids.resolve(raw).map_err(|gid| MapError::InvalidTileGid {
                        layer: l.name.clone(),
                        gid,
                        max_gid: gids.max_gid(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            IrLayerKind::Tiles {
                width: l.width,
                height: l.height,
                cells,
            }
        }
        "objectgroup" => IrLayerKind::Objects {
            objects: l
                .objects
                .into_iter()
                .map(|obj| {
                    if let Some(raw_gid) = obj.gid {
                        if !matches!(gids.resolve(raw_gid), Ok(Some(_))) {
                            return Err(MapError::InvalidObjectGid {
                                layer: l.name.clone(),
                                object_id: obj.id,
                                gid: raw_gid & GID_MASK,
                                max_gid: gids.max_gid(),
                            });
                        }
                    }
                    object_to_ir(obj)
                })
                .collect::<Result<Vec<_>, _>>()?,
        },
        "group" => IrLayerKind::Group {
            layers: l
                .layers
                .into_iter()
                .map(|child| layer_to_ir(child, gids))
                .collect::<Result<Vec<_>, _>>()?,
        },
        other => IrLayerKind::Unsupported {
            kind: other.to_owned(),
        },
    };

    Ok(IrLayer {
        name: l.name,
        properties,
        kind,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Joins `image` onto `dir` and folds `.`/`..` without touching the disk.
fn resolve_image(dir: &Path, image: &str) -> String {
    dir.join(image).normalize().to_string_lossy().into_owned()
}

fn tileset_to_ir(ts: JsonTileset, dir: &Path) -> Result<IrTileset, MapError> {
    Ok(IrTileset {
        name: ts.name,
        image: ts.image.map(|img| resolve_image(dir, &img)),
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        properties: properties_from_json(ts.properties)?,
        tiles: ts
            .tiles
            .into_iter()
            .map(|tile| -> Result<IrTile, MapError> {
                Ok(IrTile {
                    id: tile.id,
                    properties: properties_from_json(tile.properties)?,
                    frames: tile
                        .animation
                        .into_iter()
                        .map(|f| IrFrame {
                            tile_id: f.tileid,
                            duration_ms: f.duration,
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn decode_map_json(j: JsonMap, map_path: &Path, map_dir: &Path) -> Result<IrMap, MapError> {
    if j.infinite {
        return Err(MapError::InvalidMap(format!(
            "Infinite maps are not supported: {}",
            map_path.display()
        )));
    }

    // Build IR tilesets in map order
    let mut firsts = Vec::with_capacity(j.tilesets.len());
    let mut ir_tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let ir = match ts.source {
            Some(source) => {
                if !source.ends_with(".json") {
                    return Err(MapError::InvalidMap(format!(
                        "External tileset must be JSON: {}",
                        source
                    )));
                }
                let ts_path = map_dir.join(&source);
                let ext: JsonTileset = read_json(&ts_path)?;
                let ts_dir = ts_path.parent().unwrap_or(map_dir).to_path_buf();
                tileset_to_ir(ext, &ts_dir)?
            }
            None => {
                let embedded: JsonTileset = serde_json::from_value(JsonValue::Object(ts.inline))
                    .map_err(|source| MapError::Json {
                        path: map_path.to_path_buf(),
                        source,
                    })?;
                tileset_to_ir(embedded, map_dir)?
            }
        };
        firsts.push(ts.firstgid);
        ir_tilesets.push(ir);
    }

    let gids = {
        let pairs: Vec<_> = firsts.iter().copied().zip(ir_tilesets.iter()).collect();
        GidResolver::new(&pairs)
    };

    let layers = j
        .layers
        .into_iter()
        .map(|l| layer_to_ir(l, &gids))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IrMap {
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        properties: properties_from_json(j.properties)?,
        tilesets: ir_tilesets,
        layers,
    })
}

/// Loads a Tiled JSON map. Returns the map and the directory it lives in.
pub fn decode_map_file_to_ir(path: impl AsRef<Path>) -> Result<(IrMap, PathBuf), MapError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            p.display()
        )));
    }

    let j: JsonMap = read_json(p)?;

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let ir = decode_map_json(j, p, &map_dir)?;
    Ok((ir, map_dir))
}

/// Loads a Tiled JSON map from memory. External tilesets and images are
/// resolved against `base_dir`.
pub fn decode_map_str_to_ir(json: &str, base_dir: impl AsRef<Path>) -> Result<IrMap, MapError> {
    let base_dir = base_dir.as_ref();
    let j: JsonMap = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: base_dir.to_path_buf(),
        source,
    })?;
    decode_map_json(j, base_dir, base_dir)
}
