// ABOUTME: Buffered byte source with cursor accounting and a reusable scratch buffer.
// ABOUTME: Every decoder read funnels through the fill loop here.

use std::io::{self, Read};

use crate::error::{Error, Result};

/// A byte source over any [`io::Read`], counting the bytes consumed and
/// owning the decoder's scratch buffer.
///
/// Slices returned by [`read_exact`](Self::read_exact) point into the
/// scratch buffer and are valid only until the next read. The borrow
/// checker enforces that lifetime.
pub struct ByteReader<R> {
    inner: io::BufReader<R>,
    cursor: u64,
    scratch: Vec<u8>,
}

impl<R: Read> ByteReader<R> {
    /// Create a byte source with the given read-ahead buffer size.
    pub fn new(inner: R, buf_size: usize) -> Self {
        Self {
            inner: io::BufReader::with_capacity(buf_size, inner),
            cursor: 0,
            scratch: Vec::new(),
        }
    }

    /// Count of bytes consumed from the source so far.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let [b] = self.read_bytes()?;
        Ok(b)
    }

    /// Read a fixed-width field.
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        Self::fill(&mut self.inner, &mut self.cursor, &mut out)?;
        Ok(out)
    }

    /// Read exactly `len` bytes into the scratch buffer and return them.
    /// The scratch buffer grows to the largest length requested and is
    /// reused across calls.
    pub fn read_exact(&mut self, len: usize) -> Result<&[u8]> {
        if self.scratch.len() < len {
            self.scratch.resize(len, 0);
        }
        Self::fill(&mut self.inner, &mut self.cursor, &mut self.scratch[..len])?;
        Ok(&self.scratch[..len])
    }

    /// Read until `buf` is full, landing each transfer past the bytes
    /// already filled. The cursor advances per transfer, so a short read
    /// followed by an error leaves it at the partial count.
    fn fill(inner: &mut io::BufReader<R>, cursor: &mut u64, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::UnexpectedEof),
                Ok(n) => {
                    filled += n;
                    *cursor += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }
}
