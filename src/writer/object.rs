//! Object record:
//!
//! ```text
//! Properties, string name, string type, i32 shape
//!     shape 0 = rect:    f32 x, y, w, h
//!     shape 1 = point:   f32 x, y
//!     shape 2 = polygon: u32 vertex_count, (f32 x, f32 y)[vertex_count], absolute
//! ```

use super::properties::{write_properties, Owner};
use super::{primitive::WriteDat, write_tag, EncodeState};
use crate::error::{Diagnostic, ExportError};
use crate::ir_map::{IrObject, ObjectShape};
use byteorder::{WriteBytesExt, LE};
use std::io::Write;

/// Shape tag written before the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ShapeKind {
    /// `f32 x, y, w, h`.
    Rectangle = 0,
    /// `f32 x, y`.
    Point = 1,
    /// `u32 count` then absolute `f32` pairs.
    Polygon = 2,
}

impl ObjectShape {
    /// Tag for this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ObjectShape::Rectangle { .. } => ShapeKind::Rectangle,
            ObjectShape::Point { .. } => ShapeKind::Point,
            ObjectShape::Polygon(_) => ShapeKind::Polygon,
        }
    }
}

pub(crate) fn write_object<W: Write + ?Sized>(
    w: &mut W,
    obj: &IrObject,
    layer: &str,
    state: &mut EncodeState<'_>,
) -> Result<(), ExportError> {
    let owner = Owner::Object {
        layer,
        name: &obj.name,
        id: obj.id,
    };

    let config = state.config;
    for required in config.required_for(&obj.class_name) {
        if !obj.properties.contains(required) {
            state.report(Diagnostic::MissingRequiredProperty {
                owner: owner.to_string(),
                name: required.clone(),
            });
        }
    }

    write_properties(w, &obj.properties, owner, state)?;
    w.write_dat_string(&obj.name)?;
    w.write_dat_string(&obj.class_name)?;

    let shape = obj.shape();
    write_tag(w, shape.kind() as i32)?;
    match shape {
        ObjectShape::Rectangle {
            x,
            y,
            width,
            height,
        } => {
            for v in [x, y, width, height] {
                w.write_f32::<LE>(v)?;
            }
        }
        ObjectShape::Point { x, y } => {
            w.write_f32::<LE>(x)?;
            w.write_f32::<LE>(y)?;
        }
        ObjectShape::Polygon(points) => {
            w.write_len("polygon", points.len())?;
            for p in points {
                w.write_f32::<LE>(p.x)?;
                w.write_f32::<LE>(p.y)?;
            }
        }
    }

    Ok(())
}
