//! Delimiter conventions for production records.
//!
//! Every record uses three logical separators:
//!
//! | delimiter | raw byte | mnemonic |
//! |-----------|----------|----------|
//! | Record    | `0x1E`   | `^RS`    |
//! | Group     | `0x1D`   | `^GS`    |
//! | Unit      | `0x1F`   | `^US`    |
//!
//! A [`Mode`] picks one representation for a whole encode/decode cycle.
//! Codecs receive a [`Delimiters`] value explicitly instead of consulting
//! shared tables.

use std::fmt;

/// Which textual representation the delimiters use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Single control bytes (`0x1E`, `0x1D`, `0x1F`).
    #[default]
    RawControl,
    /// Caret mnemonics (`^RS`, `^GS`, `^US`).
    Mnemonic,
}

impl Mode {
    /// Guess the mode of a stream from its first bytes.
    ///
    /// Mnemonic files open with `^RS`; anything else is treated as raw.
    pub fn detect(head: &[u8]) -> Mode {
        if head.starts_with(Delimiter::Record.bytes(Mode::Mnemonic)) {
            Mode::Mnemonic
        } else {
            Mode::RawControl
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::RawControl => write!(f, "raw"),
            Mode::Mnemonic => write!(f, "mnemonic"),
        }
    }
}

/// One of the three logical separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// Starts every record.
    Record,
    /// Precedes every text line; the first one also ends the control area.
    Group,
    /// Separates control sub-fields and text messages.
    Unit,
}

impl Delimiter {
    /// Byte representation of this delimiter in `mode`.
    pub const fn bytes(self, mode: Mode) -> &'static [u8] {
        match (self, mode) {
            (Delimiter::Record, Mode::RawControl) => b"\x1E",
            (Delimiter::Record, Mode::Mnemonic) => b"^RS",
            (Delimiter::Group, Mode::RawControl) => b"\x1D",
            (Delimiter::Group, Mode::Mnemonic) => b"^GS",
            (Delimiter::Unit, Mode::RawControl) => b"\x1F",
            (Delimiter::Unit, Mode::Mnemonic) => b"^US",
        }
    }
}

/// The resolved delimiter bytes for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    mode: Mode,
    record: &'static [u8],
    group: &'static [u8],
    unit: &'static [u8],
}

impl Delimiters {
    pub const fn new(mode: Mode) -> Self {
        Self {
            mode,
            record: Delimiter::Record.bytes(mode),
            group: Delimiter::Group.bytes(mode),
            unit: Delimiter::Unit.bytes(mode),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn record(&self) -> &'static [u8] {
        self.record
    }

    pub fn group(&self) -> &'static [u8] {
        self.group
    }

    pub fn unit(&self) -> &'static [u8] {
        self.unit
    }
}

impl From<Mode> for Delimiters {
    fn from(mode: Mode) -> Self {
        Delimiters::new(mode)
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Split `haystack` on every occurrence of `needle`.
///
/// Always yields at least one piece; `n` occurrences yield `n + 1` pieces.
pub(crate) fn split<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    if needle.is_empty() {
        return vec![haystack];
    }
    let mut pieces = Vec::new();
    let mut rest = haystack;
    while let Some(pos) = find(rest, needle) {
        pieces.push(&rest[..pos]);
        rest = &rest[pos + needle.len()..];
    }
    pieces.push(rest);
    pieces
}

/// Split `haystack` at the first occurrence of `needle`, dropping the needle.
pub(crate) fn split_once<'a>(haystack: &'a [u8], needle: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    find(haystack, needle).map(|pos| (&haystack[..pos], &haystack[pos + needle.len()..]))
}

/// Join `pieces` with `separator` into `out`.
pub(crate) fn join_into<T: AsRef<[u8]>>(out: &mut Vec<u8>, pieces: &[T], separator: &[u8]) {
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(separator);
        }
        out.extend_from_slice(piece.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_bytes() {
        let raw = Delimiters::new(Mode::RawControl);
        assert_eq!(raw.record(), b"\x1E");
        assert_eq!(raw.group(), b"\x1D");
        assert_eq!(raw.unit(), b"\x1F");

        let mnemonic = Delimiters::from(Mode::Mnemonic);
        assert_eq!(mnemonic.record(), b"^RS");
        assert_eq!(mnemonic.group(), b"^GS");
        assert_eq!(mnemonic.unit(), b"^US");
        assert_eq!(mnemonic.mode(), Mode::Mnemonic);
    }

    #[test]
    fn test_detect_mode() {
        assert_eq!(Mode::detect(b"^RS2P000000001"), Mode::Mnemonic);
        assert_eq!(Mode::detect(b"\x1E2P000000001"), Mode::RawControl);
        assert_eq!(Mode::detect(b"^R"), Mode::RawControl);
        assert_eq!(Mode::detect(b""), Mode::RawControl);
    }

    #[test]
    fn test_split_multibyte() {
        assert_eq!(split(b"a^GSb^GS", b"^GS"), vec![&b"a"[..], b"b", b""]);
        assert_eq!(split(b"abc", b"^GS"), vec![&b"abc"[..]]);
        assert_eq!(split(b"", b"^GS"), vec![&b""[..]]);
    }

    #[test]
    fn test_split_once() {
        assert_eq!(split_once(b"ctl\x1Dx\x1Dy", b"\x1D"), Some((&b"ctl"[..], &b"x\x1Dy"[..])));
        assert_eq!(split_once(b"ctl", b"\x1D"), None);
    }

    #[test]
    fn test_join_into() {
        let mut out = Vec::new();
        join_into(&mut out, &[b"a".to_vec(), b"".to_vec(), b"c".to_vec()], b"^US");
        assert_eq!(out, b"a^US^USc");
    }
}
