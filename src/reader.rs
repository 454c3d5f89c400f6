//! Streaming records out of a file.
//!
//! [`RecordReader`] splits a source on the record delimiter and parses each
//! chunk into a [`Record`], tagging it with its place in the file. The first
//! malformed record ends the stream with an error; nothing after it is read.

use std::io::Read;
use std::iter::Peekable;

use tracing::error;

use crate::delimiter::Delimiters;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::tokenizer::{DEFAULT_BLOCK_SIZE, EofPolicy, Tokenizer};

/// Where a record sits in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Middle,
    Last,
    /// The file holds a single record.
    Only,
}

impl Position {
    fn from_flags(first: bool, last: bool) -> Self {
        match (first, last) {
            (true, true) => Position::Only,
            (true, false) => Position::First,
            (false, true) => Position::Last,
            (false, false) => Position::Middle,
        }
    }

    pub fn is_first(self) -> bool {
        matches!(self, Position::First | Position::Only)
    }

    pub fn is_last(self) -> bool {
        matches!(self, Position::Last | Position::Only)
    }
}

/// A record together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedRecord {
    /// One-based position in the file.
    pub index: usize,
    pub position: Position,
    pub record: Record,
}

/// Iterator over the records of a delimited stream.
pub struct RecordReader<R: Read> {
    tokens: Peekable<Tokenizer<R>>,
    delims: Delimiters,
    parse_text: bool,
    index: usize,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    /// Read records from `reader`. With `parse_text` false, text areas are
    /// kept opaque (see [`Record::parse`]).
    pub fn new(reader: R, delims: Delimiters, parse_text: bool) -> Self {
        Self::with_block_size(reader, delims, parse_text, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(
        reader: R,
        delims: Delimiters,
        parse_text: bool,
        block_size: usize,
    ) -> Self {
        let tokens =
            Tokenizer::with_block_size(reader, delims.record(), EofPolicy::Trimmed, block_size);
        Self {
            tokens: tokens.peekable(),
            delims,
            parse_text,
            index: 0,
            finished: false,
        }
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delims
    }

    /// Number of records yielded so far.
    pub fn count_read(&self) -> usize {
        self.index
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<PositionedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let chunk = match self.tokens.next()? {
            Ok(chunk) => chunk,
            Err(source) => {
                self.finished = true;
                return Some(Err(Error::Read { source }));
            }
        };

        self.index += 1;
        let first = self.index == 1;
        let last = self.tokens.peek().is_none();

        match Record::parse(&chunk, &self.delims, self.parse_text) {
            Ok(record) => Some(Ok(PositionedRecord {
                index: self.index,
                position: Position::from_flags(first, last),
                record,
            })),
            Err(source) => {
                self.finished = true;
                error!(
                    index = self.index,
                    record = %String::from_utf8_lossy(&chunk),
                    "malformed record: {source}"
                );
                Some(Err(Error::MalformedRecord {
                    index: self.index,
                    source,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::Mode;
    use crate::error::RecordError;
    use std::io::Cursor;

    fn read_all(input: &[u8], mode: Mode, block_size: usize) -> Vec<Result<PositionedRecord>> {
        RecordReader::with_block_size(
            Cursor::new(input.to_vec()),
            Delimiters::new(mode),
            false,
            block_size,
        )
        .collect()
    }

    #[test]
    fn test_positions() {
        let input = b"\x1E2P000000001\x1DA\x1E2P000000002\x1DB\x1E2P000000003\x1DC";
        let records: Vec<PositionedRecord> = read_all(input, Mode::RawControl, 4)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        let positions: Vec<Position> = records.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![Position::First, Position::Middle, Position::Last]);
        assert_eq!(records[2].index, 3);
        assert_eq!(records[1].record.control().record_number(), 2);
    }

    #[test]
    fn test_single_record_is_only() {
        let records = read_all(b"^RS2P000000009^GSLINE", Mode::Mnemonic, 2);
        assert_eq!(records.len(), 1);
        let record = records.into_iter().next().unwrap().unwrap();
        assert_eq!(record.position, Position::Only);
        assert!(record.position.is_first() && record.position.is_last());
    }

    #[test]
    fn test_empty_stream() {
        assert!(read_all(b"", Mode::RawControl, 16).is_empty());
    }

    #[test]
    fn test_malformed_record_stops_stream() {
        let input = b"\x1E2P000000001\x1DA\x1Eno text area\x1E2P000000003\x1DC";
        let results = read_all(input, Mode::RawControl, 2048);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(Error::MalformedRecord { index, source }) => {
                assert_eq!(*index, 2);
                assert_eq!(*source, RecordError::MissingTextArea);
            }
            other => panic!("Expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_opaque_text_is_kept() {
        let mut reader = RecordReader::new(
            Cursor::new(b"\x1E2P000000001\x1DA\x1F\x1DB".to_vec()),
            Delimiters::new(Mode::RawControl),
            false,
        );
        let record = reader.next().unwrap().unwrap().record;
        assert!(record.text_segment().is_none());
        assert_eq!(reader.count_read(), 1);
        assert!(reader.next().is_none());
    }
}
