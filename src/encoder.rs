// ABOUTME: External term format encoder covering the write side of the codec.
// ABOUTME: Emits the version byte, UTF-8 atoms, and binary payloads.

use std::io::Write;

use crate::error::{Error, Result};
use crate::types::{tag, VERSION};

/// An external term encoder that writes to any [`Write`] destination.
///
/// The write side covers the version byte, UTF-8 atoms, and binaries.
/// Lengths that overflow their wire field are rejected rather than
/// silently truncated.
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Create a new encoder that writes to the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the encoder and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Write the version byte that prefixes a complete term.
    pub fn write_version(&mut self) -> Result<()> {
        self.writer.write_all(&[VERSION])?;
        Ok(())
    }

    /// Write an atom in the UTF-8 encoding (tag 118) with a 16-bit length
    /// field.
    pub fn write_atom_utf8(&mut self, atom: &str) -> Result<()> {
        let len = u16::try_from(atom.len()).map_err(|_| Error::AtomTooLong(atom.len()))?;
        let mut header = [0u8; 3];
        header[0] = tag::ATOM_UTF8;
        header[1..].copy_from_slice(&len.to_be_bytes());
        self.writer.write_all(&header)?;
        self.writer.write_all(atom.as_bytes())?;
        Ok(())
    }

    /// Write a binary term (tag 109) with a 32-bit length field.
    pub fn write_binary(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len()).map_err(|_| Error::BinaryTooLong(data.len()))?;
        let mut header = [0u8; 5];
        header[0] = tag::BINARY;
        header[1..].copy_from_slice(&len.to_be_bytes());
        self.writer.write_all(&header)?;
        self.writer.write_all(data)?;
        Ok(())
    }
}
