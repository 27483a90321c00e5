//! Primitive encodings shared by the record writers.

use crate::error::ExportError;
use byteorder::{WriteBytesExt, LE};
use std::io::{self, Write};

/// Length-prefixed and boolean primitives of the `.dat` layout.
///
/// Fixed-width numbers go straight through `byteorder` (`write_u32::<LE>`
/// and friends); this trait only adds the pieces `byteorder` lacks.
/// Every method writes its whole record or fails.
pub trait WriteDat: Write {
    /// `u32` count prefix. Fails if `len` does not fit.
    fn write_len(&mut self, what: &str, len: usize) -> Result<(), ExportError> {
        let len32 = u32::try_from(len).map_err(|_| ExportError::TooManyValues {
            what: what.to_owned(),
            len,
        })?;
        self.write_u32::<LE>(len32)?;
        Ok(())
    }

    /// `u32 length` followed by the raw UTF-8 bytes, no terminator.
    fn write_dat_string(&mut self, s: &str) -> Result<(), ExportError> {
        self.write_len("string", s.len())?;
        self.write_all(s.as_bytes())?;
        Ok(())
    }

    /// One byte, `0` or `1`.
    fn write_dat_bool(&mut self, v: bool) -> io::Result<()> {
        self.write_u8(u8::from(v))
    }
}

impl<W: Write + ?Sized> WriteDat for W {}
