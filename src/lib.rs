// ABOUTME: Streaming codec for the Erlang external term format.
// ABOUTME: Callback-driven decoding of maps and lists over any io::Read source.

//! # erlterm
//!
//! A streaming codec for the Erlang external term format, the wire format
//! produced by `term_to_binary/1`.
//!
//! The decoder reads terms from any [`std::io::Read`] source in strict
//! sequence: callers state which shape they expect next, and list and map
//! contents are surfaced through callbacks rather than materialized into a
//! document tree. Dispatch failures carry the enclosing map keys, the
//! stream offset, and the rejecting reader, so an error from deep inside a
//! nested term reads like
//! `config: port: Unexpected term tag at 17 in read_i32: PID`.
//!
//! The encoder covers the small write side: the version byte, UTF-8 atoms,
//! and binaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use erlterm::{Decoder, VERSION};
//!
//! // {ok: 1} as a versioned external term.
//! let wire = [
//!     0x83, // version
//!     0x74, 0x00, 0x00, 0x00, 0x01, // map, one pair
//!     0x77, 0x02, b'o', b'k', // atom key "ok"
//!     0x61, 0x01, // small integer 1
//! ];
//!
//! let mut dec = Decoder::new(&wire[..], 4096);
//! assert_eq!(dec.read_version().unwrap(), VERSION);
//!
//! let mut value = 0;
//! dec.read_map(|dec, key| {
//!     match key {
//!         "ok" => value = dec.read_i32()?,
//!         _ => dec.skip_term()?,
//!     }
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(value, 1);
//! ```
//!
//! ## Decoding model
//!
//! - Each reader accepts a small set of term tags and fails fast on
//!   anything else; the stream never rewinds.
//! - List and map readers offer every element to the callback even after
//!   one fails, and return the last captured error. Only a dead source
//!   stops iteration early.
//! - Map callbacks must consume exactly one term per invocation;
//!   [`Decoder::skip_term`] consumes a term of any decodable shape and is
//!   the way to handle unrecognized keys.
//!
//! Terms this codec does not decode (pids, ports, refs, funs, tuples, the
//! atom cache protocol) are recognized by name in errors but cannot be
//! read or skipped.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod read;
pub mod types;

// Re-export commonly used items at the crate root
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, InvalidTagError, Result};
pub use read::ByteReader;
pub use types::{tag, FLOAT_TEXT_LEN, VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_roundtrip() {
        let mut enc = Encoder::new(Vec::new());
        enc.write_version().unwrap();
        enc.write_atom_utf8("session_started").unwrap();
        let wire = enc.into_inner();

        let mut dec = Decoder::new(&wire[..], 64);
        assert_eq!(dec.read_version().unwrap(), VERSION);
        assert_eq!(dec.read_atom().unwrap(), "session_started");
        assert_eq!(dec.cursor(), wire.len() as u64);
    }

    #[test]
    fn test_binary_roundtrip() {
        let mut enc = Encoder::new(Vec::new());
        enc.write_binary("payload bytes".as_bytes()).unwrap();
        let wire = enc.into_inner();

        let mut dec = Decoder::new(&wire[..], 64);
        assert_eq!(dec.read_string().unwrap(), "payload bytes");
    }

    #[test]
    fn test_encoded_terms_skip_cleanly() {
        let mut enc = Encoder::new(Vec::new());
        enc.write_atom_utf8("ignored").unwrap();
        enc.write_binary(b"also ignored").unwrap();
        let wire = enc.into_inner();

        let mut dec = Decoder::new(&wire[..], 64);
        dec.skip_term().unwrap();
        dec.skip_term().unwrap();
        assert_eq!(dec.cursor(), wire.len() as u64);
    }
}
