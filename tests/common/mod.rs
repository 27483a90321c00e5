// tests/common/mod.rs
//
// Reader for the .dat layout, used to check what the exporter wrote.
#![allow(dead_code)]

use byteorder::{ReadBytesExt, LE};
use std::io::{Cursor, Read};
use tiled_dat_export::{IrLayer, IrLayerKind, IrMap, IrObject, IrTileset, Properties};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(Vec<u8>),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatTileset {
    pub name: String,
    pub image: String,
    pub tile_count: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub animations: Vec<DatAnimation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatAnimation {
    pub tile_id: u32,
    pub frames: Vec<(u32, u32)>, // (source tile, duration ms)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatShape {
    Rect([f32; 4]),
    Point([f32; 2]),
    Polygon(Vec<[f32; 2]>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatObject {
    pub properties: Vec<(String, i32, Value)>,
    pub name: String,
    pub class_name: String,
    pub shape_tag: i32,
    pub shape: DatShape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatLayerKind {
    Tiles {
        width: u32,
        height: u32,
        cells: Vec<(i16, i16)>, // (tile_id, tileset_index)
    },
    Objects(Vec<DatObject>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatLayer {
    pub name: String,
    pub properties: Vec<(String, i32, Value)>,
    pub kind_tag: i32,
    pub kind: DatLayerKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatMap {
    pub properties: Vec<(String, i32, Value)>,
    pub tilesets: Vec<DatTileset>,
    pub layer_count: u32,
    pub layers: Vec<DatLayer>,
}

struct Reader<'a>(Cursor<&'a [u8]>);

impl Reader<'_> {
    fn u32(&mut self) -> u32 {
        self.0.read_u32::<LE>().expect("u32")
    }
    fn i32(&mut self) -> i32 {
        self.0.read_i32::<LE>().expect("i32")
    }
    fn i16(&mut self) -> i16 {
        self.0.read_i16::<LE>().expect("i16")
    }
    fn f32(&mut self) -> f32 {
        self.0.read_f32::<LE>().expect("f32")
    }
    fn f64(&mut self) -> f64 {
        self.0.read_f64::<LE>().expect("f64")
    }
    fn bytes(&mut self) -> Vec<u8> {
        let len = self.u32() as usize;
        let mut buf = vec![0; len];
        self.0.read_exact(&mut buf).expect("string bytes");
        buf
    }
    fn string(&mut self) -> String {
        String::from_utf8(self.bytes()).expect("utf8")
    }

    fn properties(&mut self) -> Vec<(String, i32, Value)> {
        let count = self.u32();
        (0..count)
            .map(|_| {
                let name = self.string();
                let tag = self.i32();
                let value = match tag {
                    0 => Value::Bool(match self.0.read_u8().expect("bool") {
                        0 => false,
                        1 => true,
                        b => panic!("bool byte {b}"),
                    }),
                    1 => Value::Number(self.f64()),
                    2 => Value::String(self.bytes()),
                    -1 => Value::Unsupported,
                    t => panic!("property tag {t}"),
                };
                (name, tag, value)
            })
            .collect()
    }

    fn tileset(&mut self) -> DatTileset {
        let name = self.string();
        let image = self.string();
        let tile_count = self.u32();
        let tile_w = self.u32();
        let tile_h = self.u32();
        let animations = (0..self.u32())
            .map(|_| {
                let frame_count = self.u32();
                let tile_id = self.u32();
                let frames = (0..frame_count).map(|_| (self.u32(), self.u32())).collect();
                DatAnimation { tile_id, frames }
            })
            .collect();
        DatTileset {
            name,
            image,
            tile_count,
            tile_w,
            tile_h,
            animations,
        }
    }

    fn object(&mut self) -> DatObject {
        let properties = self.properties();
        let name = self.string();
        let class_name = self.string();
        let shape_tag = self.i32();
        let shape = match shape_tag {
            0 => DatShape::Rect([self.f32(), self.f32(), self.f32(), self.f32()]),
            1 => DatShape::Point([self.f32(), self.f32()]),
            2 => DatShape::Polygon((0..self.u32()).map(|_| [self.f32(), self.f32()]).collect()),
            t => panic!("shape tag {t}"),
        };
        DatObject {
            properties,
            name,
            class_name,
            shape_tag,
            shape,
        }
    }

    fn layer(&mut self) -> DatLayer {
        let name = self.string();
        let properties = self.properties();
        let kind_tag = self.i32();
        let kind = match kind_tag {
            0 => {
                let width = self.u32();
                let height = self.u32();
                let cells = (0..width * height).map(|_| (self.i16(), self.i16())).collect();
                DatLayerKind::Tiles {
                    width,
                    height,
                    cells,
                }
            }
            1 => DatLayerKind::Objects((0..self.u32()).map(|_| self.object()).collect()),
            -1 => DatLayerKind::Unknown,
            t => panic!("layer kind {t}"),
        };
        DatLayer {
            name,
            properties,
            kind_tag,
            kind,
        }
    }
}

/// Decodes a whole file and checks nothing is left over.
pub fn read_dat(bytes: &[u8]) -> DatMap {
    let mut r = Reader(Cursor::new(bytes));
    let properties = r.properties();
    let tilesets = (0..r.u32()).map(|_| r.tileset()).collect();
    let layer_count = r.u32();
    let layers = (0..layer_count).map(|_| r.layer()).collect();
    assert_eq!(r.0.position() as usize, bytes.len(), "trailing bytes");
    DatMap {
        properties,
        tilesets,
        layer_count,
        layers,
    }
}

pub fn tileset(name: &str, tilecount: u32) -> IrTileset {
    IrTileset {
        name: name.to_owned(),
        image: Some(format!("/home/dev/game/res/bmp/{name}.bmp")),
        tile_w: 16,
        tile_h: 16,
        tilecount,
        ..Default::default()
    }
}

pub fn object_layer(name: &str, objects: Vec<IrObject>) -> IrLayer {
    IrLayer::new(name, IrLayerKind::Objects { objects })
}

pub fn group(name: &str, layers: Vec<IrLayer>) -> IrLayer {
    IrLayer::new(name, IrLayerKind::Group { layers })
}

pub fn map_with(tilesets: Vec<IrTileset>, layers: Vec<IrLayer>) -> IrMap {
    IrMap {
        tile_w: 16,
        tile_h: 16,
        properties: Properties::new(),
        tilesets,
        layers,
    }
}
