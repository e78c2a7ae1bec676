// ABOUTME: Streaming external term format decoder with callback-driven containers.
// ABOUTME: Readers dispatch on one tag byte and annotate failures with the field path.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use std::io::Read;

use num_bigint::BigUint;

use crate::error::{Error, InvalidTagError, Result};
use crate::read::ByteReader;
use crate::types::{tag, FLOAT_TEXT_LEN};

/// Powers of 256 for the small big-integer fast path.
const POW256: [u64; 8] = [
    1,
    1 << 8,
    1 << 16,
    1 << 24,
    1 << 32,
    1 << 40,
    1 << 48,
    1 << 56,
];

/// Deepest container nesting the skip protocol will follow.
const MAX_SKIP_DEPTH: usize = 512;

/// Skips drain large payloads through scratch in chunks of this size, so a
/// hostile length field cannot force a giant allocation.
const SKIP_CHUNK: usize = 0x1000;

/// A streaming decoder for external terms.
///
/// Terms are pulled from the source in strict sequence. Nothing is staged
/// beyond the read-ahead of the internal buffered reader and one scratch
/// buffer for payload bytes; list and map contents are surfaced through
/// callbacks instead of being materialized.
pub struct Decoder<R> {
    src: ByteReader<R>,
    /// Map keys enclosing the current read position, outermost first.
    field_path: Vec<String>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder with the given read-ahead buffer size.
    #[must_use]
    pub fn new(reader: R, buf_size: usize) -> Self {
        Self {
            src: ByteReader::new(reader, buf_size),
            field_path: Vec::new(),
        }
    }

    /// Count of bytes consumed from the source so far.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.src.cursor()
    }

    /// Map keys enclosing the current read position, outermost first.
    /// Callbacks can use this to contextualize their own errors.
    #[must_use]
    pub fn field_path(&self) -> &[String] {
        &self.field_path
    }

    /// Read the version byte that prefixes a complete term. The caller
    /// decides whether anything other than [`VERSION`](crate::VERSION) is
    /// acceptable.
    pub fn read_version(&mut self) -> Result<u8> {
        self.src.read_byte()
    }

    // =========================================================================
    // Primitive readers
    // =========================================================================

    /// Read an atom as a string.
    ///
    /// Accepts both atom encodings in their one- and two-byte length forms,
    /// plus STRING terms, which legacy emitters use for atom-like values.
    /// Bytes are copied out without validation; ill-formed UTF-8 is
    /// replaced rather than rejected.
    pub fn read_atom(&mut self) -> Result<String> {
        let tag_byte = self.src.read_byte()?;
        let len = match tag_byte {
            tag::ATOM | tag::ATOM_UTF8 | tag::STRING => usize::from(self.read_u16()?),
            tag::SMALL_ATOM | tag::SMALL_ATOM_UTF8 => usize::from(self.src.read_byte()?),
            _ => return Err(self.invalid_tag(tag_byte, "read_atom")),
        };
        let bytes = self.src.read_exact(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a boolean, carried on the wire as the atom `"true"` or
    /// `"false"`. Any other atom reads as `false`.
    pub fn read_bool(&mut self) -> Result<bool> {
        let atom = self.read_atom()?;
        Ok(atom == "true")
    }

    /// Read string-like content: any atom form, a STRING term, or a BINARY
    /// payload.
    pub fn read_string(&mut self) -> Result<String> {
        let tag_byte = self.src.read_byte()?;
        let len = match tag_byte {
            tag::ATOM | tag::ATOM_UTF8 | tag::STRING => usize::from(self.read_u16()?),
            tag::SMALL_ATOM | tag::SMALL_ATOM_UTF8 => usize::from(self.src.read_byte()?),
            tag::BINARY => self.read_u32()? as usize,
            _ => return Err(self.invalid_tag(tag_byte, "read_string")),
        };
        let bytes = self.src.read_exact(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a 32-bit integer from a SMALL_INTEGER or INTEGER term.
    pub fn read_i32(&mut self) -> Result<i32> {
        let tag_byte = self.src.read_byte()?;
        match tag_byte {
            tag::SMALL_INTEGER => Ok(i32::from(self.src.read_byte()?)),
            tag::INTEGER => Ok(i32::from_be_bytes(self.src.read_bytes()?)),
            _ => Err(self.invalid_tag(tag_byte, "read_i32")),
        }
    }

    /// Read a 64-bit integer from a fixed-size integer term or either
    /// big-integer form.
    ///
    /// Big magnitudes of up to 8 bytes take a table-driven fast path;
    /// longer bodies go through an arbitrary-precision integer. Either way
    /// the signed result must fit an `i64` or the read fails with
    /// [`Error::IntOutOfRange`].
    pub fn read_i64(&mut self) -> Result<i64> {
        let tag_byte = self.src.read_byte()?;
        match tag_byte {
            tag::SMALL_INTEGER => Ok(i64::from(self.src.read_byte()?)),
            tag::INTEGER => Ok(i64::from(i32::from_be_bytes(self.src.read_bytes()?))),
            tag::SMALL_BIG => {
                let len = usize::from(self.src.read_byte()?);
                self.read_big(len)
            }
            tag::LARGE_BIG => {
                let len = self.read_u32()? as usize;
                self.read_big(len)
            }
            _ => Err(self.invalid_tag(tag_byte, "read_i64")),
        }
    }

    /// Read a 64-bit float from a NEW_FLOAT or old-style FLOAT term.
    pub fn read_f64(&mut self) -> Result<f64> {
        let tag_byte = self.src.read_byte()?;
        match tag_byte {
            tag::NEW_FLOAT => Ok(f64::from_be_bytes(self.src.read_bytes()?)),
            tag::FLOAT => self.read_float_text(),
            _ => {
                let err = self.invalid_tag(tag_byte, "read_f64");
                // Best effort: drop the unexpected term so a caller inside
                // a container can carry on in sequence.
                _ = self.skip_tagged(tag_byte, 0);
                Err(err)
            }
        }
    }

    // =========================================================================
    // Aggregate readers
    // =========================================================================

    /// Read a LIST term, invoking `each` once per element.
    ///
    /// Every element is offered even when an earlier callback fails; the
    /// last captured error is returned after the loop. Errors that mean
    /// the source itself is dead stop immediately. Each invocation must
    /// consume exactly one term ([`skip_term`](Self::skip_term) counts).
    /// The trailing tail term, normally NIL, is consumed on the way out.
    pub fn read_list<F>(&mut self, mut each: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        let tag_byte = self.src.read_byte()?;
        if tag_byte != tag::LIST {
            let err = self.invalid_tag(tag_byte, "read_list");
            _ = self.skip_tagged(tag_byte, 0);
            return Err(err);
        }
        let count = self.read_u32()?;
        let mut last_err = None;
        for _ in 0..count {
            match each(self) {
                Ok(()) => {}
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => last_err = Some(e),
            }
        }
        // The tail never reaches the element callback; drop it best effort.
        _ = self.skip_term();
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Read a MAP term, invoking `field` once per pair with the key.
    ///
    /// Keys decode with [`read_atom`](Self::read_atom). While the callback
    /// runs the key sits on the field path, so errors raised under it
    /// carry their context. A pair whose key fails to decode has its value
    /// skipped and iteration continues. As with lists the last captured
    /// error is returned, terminal errors stop immediately, and each
    /// invocation must consume exactly one term.
    pub fn read_map<F>(&mut self, mut field: F) -> Result<()>
    where
        F: FnMut(&mut Self, &str) -> Result<()>,
    {
        let tag_byte = self.src.read_byte()?;
        if tag_byte != tag::MAP {
            let err = self.invalid_tag(tag_byte, "read_map");
            _ = self.skip_tagged(tag_byte, 0);
            return Err(err);
        }
        let pairs = self.read_u32()?;
        let depth = self.field_path.len();
        let mut last_err = None;
        for _ in 0..pairs {
            let key = match self.read_atom() {
                Ok(key) => key,
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => {
                    last_err = Some(e);
                    // Keep the pair alignment by dropping the value term.
                    match self.skip_term() {
                        Ok(()) => {}
                        Err(e) if e.is_terminal() => return Err(e),
                        Err(e) => last_err = Some(e),
                    }
                    continue;
                }
            };
            self.field_path.push(key.clone());
            let res = field(self, &key);
            self.field_path.truncate(depth);
            match res {
                Ok(()) => {}
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => last_err = Some(e),
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Skipping
    // =========================================================================

    /// Consume exactly one term of any decodable shape without producing a
    /// value. Container terms are walked recursively.
    ///
    /// Terms this codec cannot measure (pids, ports, refs, funs, tuples,
    /// the atom cache protocol) fail with [`Error::Desync`]: their bytes
    /// are still in the stream and term boundaries are lost.
    pub fn skip_term(&mut self) -> Result<()> {
        let tag_byte = self.src.read_byte()?;
        self.skip_tagged(tag_byte, 0)
    }

    /// Skip the remainder of a term whose tag byte is already consumed.
    fn skip_tagged(&mut self, tag_byte: u8, depth: usize) -> Result<()> {
        if depth > MAX_SKIP_DEPTH {
            return Err(Error::SkipDepthExceeded);
        }
        match tag_byte {
            tag::NIL => Ok(()),
            tag::SMALL_INTEGER => self.skip_payload(1),
            tag::INTEGER => self.skip_payload(4),
            tag::NEW_FLOAT => self.skip_payload(8),
            tag::FLOAT => self.skip_payload(FLOAT_TEXT_LEN),
            tag::SMALL_ATOM | tag::SMALL_ATOM_UTF8 => {
                let len = usize::from(self.src.read_byte()?);
                self.skip_payload(len)
            }
            tag::ATOM | tag::ATOM_UTF8 | tag::STRING => {
                let len = usize::from(self.read_u16()?);
                self.skip_payload(len)
            }
            tag::BINARY => {
                let len = self.read_u32()? as usize;
                self.skip_payload(len)
            }
            tag::SMALL_BIG => {
                let len = usize::from(self.src.read_byte()?);
                self.src.read_byte()?; // sign
                self.skip_payload(len)
            }
            tag::LARGE_BIG => {
                let len = self.read_u32()? as usize;
                self.src.read_byte()?; // sign
                self.skip_payload(len)
            }
            tag::LIST => {
                let count = self.read_u32()?;
                for _ in 0..count {
                    let t = self.src.read_byte()?;
                    self.skip_tagged(t, depth + 1)?;
                }
                // One more for the tail term.
                let t = self.src.read_byte()?;
                self.skip_tagged(t, depth + 1)
            }
            tag::MAP => {
                let pairs = self.read_u32()?;
                for _ in 0..u64::from(pairs) * 2 {
                    let t = self.src.read_byte()?;
                    self.skip_tagged(t, depth + 1)?;
                }
                Ok(())
            }
            _ => Err(Error::Desync {
                tag: tag_byte,
                cursor: self.src.cursor(),
            }),
        }
    }

    /// Drain `len` payload bytes through scratch in bounded chunks.
    fn skip_payload(&mut self, len: usize) -> Result<()> {
        let mut left = len;
        while left > 0 {
            let take = left.min(SKIP_CHUNK);
            self.src.read_exact(take)?;
            left -= take;
        }
        Ok(())
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.src.read_bytes()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.src.read_bytes()?))
    }

    /// Decode a big-integer body: one sign byte, then `len` magnitude
    /// bytes, least significant first.
    fn read_big(&mut self, len: usize) -> Result<i64> {
        let negative = self.src.read_byte()? != 0;
        let bytes = self.src.read_exact(len)?;
        let magnitude = if len <= POW256.len() {
            let mut mag: u64 = 0;
            for (i, &b) in bytes.iter().enumerate() {
                mag += u64::from(b) * POW256[i];
            }
            mag
        } else {
            // Non-canonical encodings may pad with zero bytes, so a long
            // body can still hold a small value.
            let big = BigUint::from_bytes_le(bytes);
            u64::try_from(big).map_err(|_| Error::IntOutOfRange)?
        };
        signed_from_magnitude(magnitude, negative)
    }

    /// Parse the NUL-padded `%.20e` text body of an old-style float.
    fn read_float_text(&mut self) -> Result<f64> {
        let bytes = self.src.read_exact(FLOAT_TEXT_LEN)?;
        let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
        let text = match std::str::from_utf8(&bytes[..end]) {
            Ok(text) => text.trim(),
            Err(_) => {
                return Err(Error::MalformedFloat(
                    String::from_utf8_lossy(&bytes[..end]).into_owned(),
                ))
            }
        };
        text.parse()
            .map_err(|_| Error::MalformedFloat(text.to_owned()))
    }

    /// Build the dispatch failure for `caller`, snapshotting the field
    /// path and the offset just past the offending tag byte.
    fn invalid_tag(&self, tag_byte: u8, caller: &'static str) -> Error {
        Error::InvalidTag(InvalidTagError {
            field_path: self.field_path.clone(),
            cursor: self.src.cursor(),
            tag: tag_byte,
            caller,
        })
    }
}

/// Apply a sign to an unsigned magnitude, checking that the result is
/// representable. The negative side has one extra unit of range.
fn signed_from_magnitude(magnitude: u64, negative: bool) -> Result<i64> {
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(Error::IntOutOfRange);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| Error::IntOutOfRange)
    }
}
