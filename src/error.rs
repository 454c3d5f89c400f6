//! Error types for record parsing and file rewriting.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for record codec operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Structural violations found while parsing a record.
///
/// These are raised at parse time and make the record unusable. Field setters
/// never produce them; bad setter input is ignored instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// No group delimiter separates the control area from the text area.
    #[error("missing text area: no group delimiter after the control area")]
    MissingTextArea,

    /// More message groups than the text area can hold.
    #[error("too many text messages: {count} (max {max})", max = crate::text::MAX_MESSAGES)]
    TooManyTextMessages {
        /// Number of message groups found.
        count: usize,
    },

    /// One message group holds too many lines.
    #[error(
        "too many lines in text message {message}: {count} (max {max})",
        max = crate::text::MAX_LINES_PER_MESSAGE
    )]
    TooManyLinesInMessage {
        /// Zero-based index of the offending message.
        message: usize,
        /// Number of lines in that message.
        count: usize,
    },

    /// The text area holds too many lines across all messages.
    #[error(
        "too many text lines in total: {count} (max {max})",
        max = crate::text::MAX_TOTAL_LINES
    )]
    TooManyLinesTotal {
        /// Running line count when the limit was crossed.
        count: usize,
    },

    /// The control area has no sub-fields or more than eight.
    #[error(
        "invalid control segment count: {count} (expected 1 to {max})",
        max = crate::control::MAX_FIELDS
    )]
    InvalidControlSegmentCount {
        /// Number of sub-fields found.
        count: usize,
    },

    /// Sub-field 1 does not end in a decimal record number.
    #[error("invalid record number field `{value}`")]
    InvalidRecordNumber {
        /// The sub-field as found, lossily decoded.
        value: String,
    },
}

/// Result type for stream and file driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while streaming records from a source to a destination.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot access `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read record stream")]
    Read {
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write record stream")]
    Write {
        #[source]
        source: std::io::Error,
    },

    /// A record failed structural validation; processing of the file stops.
    #[error("malformed record {index}")]
    MalformedRecord {
        /// One-based position of the record in its file.
        index: usize,
        #[source]
        source: RecordError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        assert_eq!(
            RecordError::TooManyTextMessages { count: 21 }.to_string(),
            "too many text messages: 21 (max 20)"
        );
        assert_eq!(
            RecordError::InvalidControlSegmentCount { count: 9 }.to_string(),
            "invalid control segment count: 9 (expected 1 to 8)"
        );
        assert_eq!(
            RecordError::TooManyLinesInMessage {
                message: 2,
                count: 145
            }
            .to_string(),
            "too many lines in text message 2: 145 (max 144)"
        );
    }

    #[test]
    fn test_malformed_record_source() {
        use std::error::Error as _;

        let err = Error::MalformedRecord {
            index: 3,
            source: RecordError::MissingTextArea,
        };
        assert_eq!(err.to_string(), "malformed record 3");
        assert!(err.source().is_some());
    }
}
