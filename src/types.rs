// ABOUTME: Defines the external term format tag bytes and wire constants.
// ABOUTME: Tag values map directly to the Erlang term_to_binary byte values.

/// The version byte that prefixes a complete external term.
pub const VERSION: u8 = 131;

/// Byte length of the text body of an old-style float term (tag 99).
/// Erlang formats the value with `sprintf("%.20e", ..)` and pads the
/// remainder with NUL bytes.
pub const FLOAT_TEXT_LEN: usize = 31;

/// Term tags for external term format values.
/// These are the tag bytes `term_to_binary/1` puts on the wire.
pub mod tag {
    // Atoms. The UTF-8 forms are what modern emitters produce; the Latin-1
    // forms still appear on the wire from older nodes.
    pub const ATOM: u8 = 100; // 'd'
    pub const SMALL_ATOM: u8 = 115; // 's'
    pub const ATOM_UTF8: u8 = 118; // 'v'
    pub const SMALL_ATOM_UTF8: u8 = 119; // 'w'

    // Byte sequences
    pub const STRING: u8 = 107; // 'k'
    pub const BINARY: u8 = 109; // 'm'
    pub const BIT_BINARY: u8 = 77; // 'M'

    // Integers
    pub const SMALL_INTEGER: u8 = 97; // 'a'
    pub const INTEGER: u8 = 98; // 'b'
    pub const SMALL_BIG: u8 = 110; // 'n'
    pub const LARGE_BIG: u8 = 111; // 'o'

    // Floats
    pub const FLOAT: u8 = 99; // 'c'
    pub const NEW_FLOAT: u8 = 70; // 'F'

    // Containers
    pub const SMALL_TUPLE: u8 = 104; // 'h'
    pub const LARGE_TUPLE: u8 = 105; // 'i'
    pub const NIL: u8 = 106; // 'j'
    pub const LIST: u8 = 108; // 'l'
    pub const MAP: u8 = 116; // 't'

    // Process identifiers and references
    pub const REF: u8 = 101; // 'e'
    pub const PORT: u8 = 102; // 'f'
    pub const PID: u8 = 103; // 'g'
    pub const NEW_REF: u8 = 114; // 'r'

    // Funs
    pub const FUN: u8 = 117; // 'u'
    pub const NEW_FUN: u8 = 112; // 'p'
    pub const EXPORT: u8 = 113; // 'q'

    // Atom cache protocol
    pub const CACHED_ATOM: u8 = 67; // 'C'
    pub const NEW_CACHE: u8 = 78; // 'N'
    pub const CACHE_REF: u8 = 82; // 'R'

    /// Printable name of a tag byte, for error messages.
    /// Unrecognized bytes render as `"UNKNOWN"`.
    #[inline]
    pub const fn name(tag: u8) -> &'static str {
        match tag {
            ATOM => "ATOM",
            SMALL_ATOM => "SMALL_ATOM",
            ATOM_UTF8 => "ATOM_UTF8",
            SMALL_ATOM_UTF8 => "SMALL_ATOM_UTF8",
            STRING => "STRING",
            BINARY => "BINARY",
            BIT_BINARY => "BIT_BINARY",
            SMALL_INTEGER => "SMALL_INTEGER",
            INTEGER => "INTEGER",
            SMALL_BIG => "SMALL_BIG",
            LARGE_BIG => "LARGE_BIG",
            FLOAT => "FLOAT",
            NEW_FLOAT => "NEW_FLOAT",
            SMALL_TUPLE => "SMALL_TUPLE",
            LARGE_TUPLE => "LARGE_TUPLE",
            NIL => "NIL",
            LIST => "LIST",
            MAP => "MAP",
            REF => "REF",
            PORT => "PORT",
            PID => "PID",
            NEW_REF => "NEW_REF",
            FUN => "FUN",
            NEW_FUN => "NEW_FUN",
            EXPORT => "EXPORT",
            CACHED_ATOM => "CACHED_ATOM",
            NEW_CACHE => "NEW_CACHE",
            CACHE_REF => "CACHE_REF",
            _ => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_ascii_mnemonics() {
        // The decodable subset uses lowercase ASCII mnemonics.
        assert_eq!(tag::SMALL_INTEGER, b'a');
        assert_eq!(tag::INTEGER, b'b');
        assert_eq!(tag::FLOAT, b'c');
        assert_eq!(tag::ATOM, b'd');
        assert_eq!(tag::NIL, b'j');
        assert_eq!(tag::STRING, b'k');
        assert_eq!(tag::LIST, b'l');
        assert_eq!(tag::BINARY, b'm');
        assert_eq!(tag::SMALL_BIG, b'n');
        assert_eq!(tag::LARGE_BIG, b'o');
        assert_eq!(tag::SMALL_ATOM, b's');
        assert_eq!(tag::MAP, b't');
        assert_eq!(tag::ATOM_UTF8, b'v');
        assert_eq!(tag::SMALL_ATOM_UTF8, b'w');
        assert_eq!(tag::NEW_FLOAT, b'F');
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(tag::name(tag::ATOM_UTF8), "ATOM_UTF8");
        assert_eq!(tag::name(tag::BINARY), "BINARY");
        assert_eq!(tag::name(tag::NEW_FLOAT), "NEW_FLOAT");
        assert_eq!(tag::name(tag::CACHE_REF), "CACHE_REF");
        assert_eq!(tag::name(0), "UNKNOWN");
        assert_eq!(tag::name(255), "UNKNOWN");
    }

    #[test]
    fn test_version_byte() {
        assert_eq!(VERSION, 0x83);
    }
}
