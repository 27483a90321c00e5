//! Properties record:
//!
//! ```text
//! u32 count
//! (string name, i32 type, value)[count]
//!     type 0 = bool (1 byte), 1 = number (f64), 2 = string, -1 = unsupported (no value)
//! ```

use super::{primitive::WriteDat, write_tag, EncodeState};
use crate::error::{Diagnostic, ExportError};
use crate::ir_map::{Properties, PropertyValue};
use byteorder::{WriteBytesExt, LE};
use std::fmt;
use std::io::Write;

/// Property type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PropertyType {
    /// One byte, `0` or `1`.
    Bool = 0,
    /// `f64`.
    Number = 1,
    /// Length-prefixed UTF-8.
    String = 2,
    /// No value follows.
    Unsupported = -1,
}

impl PropertyType {
    /// Tag written for `value`.
    pub fn of(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Number(_) => PropertyType::Number,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Unsupported { .. } => PropertyType::Unsupported,
        }
    }
}

/// What a property set belongs to, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Owner<'a> {
    Map,
    Layer(&'a str),
    Object {
        layer: &'a str,
        name: &'a str,
        id: u32,
    },
}

impl fmt::Display for Owner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Map => write!(f, "map"),
            Owner::Layer(name) => write!(f, "layer '{}'", name),
            Owner::Object { layer, name, id } => {
                write!(f, "object '{}' (#{}) in layer '{}'", name, id, layer)
            }
        }
    }
}

pub(crate) fn write_properties<W: Write + ?Sized>(
    w: &mut W,
    props: &Properties,
    owner: Owner<'_>,
    state: &mut EncodeState<'_>,
) -> Result<(), ExportError> {
    w.write_len("property list", props.len())?;

    for (name, value) in props.iter() {
        w.write_dat_string(name)?;
        write_tag(w, PropertyType::of(value) as i32)?;

        match value {
            PropertyValue::Bool(v) => w.write_dat_bool(*v)?,
            PropertyValue::Number(v) => w.write_f64::<LE>(*v)?,
            PropertyValue::String(v) => w.write_dat_string(v)?,
            PropertyValue::Unsupported { kind } => {
                if state.config.strict_properties {
                    return Err(ExportError::UnsupportedProperty {
                        owner: owner.to_string(),
                        name: name.to_owned(),
                        kind: kind.clone(),
                    });
                }
                state.report(Diagnostic::UnsupportedPropertyType {
                    owner: owner.to_string(),
                    name: name.to_owned(),
                    kind: kind.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;

    fn encode(props: &Properties, config: &ExportConfig) -> (Vec<u8>, Vec<Diagnostic>) {
        let mut state = EncodeState {
            config,
            used_tilesets: Vec::new(),
            diagnostics: Vec::new(),
        };
        let mut buf: Vec<u8> = Vec::new();
        write_properties(&mut buf, props, Owner::Layer("ground"), &mut state).unwrap();
        (buf, state.diagnostics)
    }

    #[test]
    fn empty_set_is_a_zero_count() {
        let (buf, diags) = encode(&Properties::new(), &ExportConfig::default());
        assert_eq!(buf, [0, 0, 0, 0]);
        assert!(diags.is_empty());
    }

    #[test]
    fn bool_record_layout() {
        let props = Properties::new().with("locked", PropertyValue::Bool(true));
        let (buf, _) = encode(&props, &ExportConfig::default());
        let mut expected = vec![1, 0, 0, 0, 6, 0, 0, 0];
        expected.extend_from_slice(b"locked");
        expected.extend_from_slice(&[0, 0, 0, 0, 1]);
        assert_eq!(buf, expected);
    }

    #[test]
    fn integral_numbers_are_written_as_f64() {
        let props = Properties::new().with("hp", PropertyValue::Number(3.0));
        let (buf, _) = encode(&props, &ExportConfig::default());
        assert_eq!(&buf[10..14], &1i32.to_le_bytes());
        assert_eq!(&buf[14..], &3.0f64.to_le_bytes());
    }

    #[test]
    fn unsupported_type_writes_tag_only_and_reports() {
        let props = Properties::new()
            .with("tint", PropertyValue::Unsupported { kind: "color".into() })
            .with("a", PropertyValue::Bool(false));
        let (buf, diags) = encode(&props, &ExportConfig::default());

        // count, "tint", tag -1, then straight into the next record
        assert_eq!(&buf[12..16], &(-1i32).to_le_bytes());
        assert_eq!(&buf[16..20], &1u32.to_le_bytes());
        assert_eq!(buf[20], b'a');
        assert_eq!(
            diags,
            vec![Diagnostic::UnsupportedPropertyType {
                owner: "layer 'ground'".into(),
                name: "tint".into(),
                kind: "color".into(),
            }]
        );
    }

    #[test]
    fn strict_mode_rejects_unsupported_types() {
        let config = ExportConfig {
            strict_properties: true,
            ..Default::default()
        };
        let mut state = EncodeState {
            config: &config,
            used_tilesets: Vec::new(),
            diagnostics: Vec::new(),
        };
        let props = Properties::new().with("ref", PropertyValue::Unsupported { kind: "object".into() });
        let err = write_properties(&mut Vec::<u8>::new(), &props, Owner::Map, &mut state).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedProperty { ref kind, .. } if kind == "object"));
    }
}
