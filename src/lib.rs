//! # vipnt-rs
//!
//! Codec for VIP-NT style production records, the delimited print data that
//! drives addressed-mail inkjet lines.
//!
//! ## Overview
//!
//! A production file is a run of records. Each record has:
//! - **Control area**: up to 8 sub-fields of routing metadata (record
//!   number, sort and consolidation codes, pallet ID, version, QC flag, ...)
//! - **Text area**: up to 20 messages of up to 144 printed lines each
//!
//! Delimiters come in two spellings, raw control bytes (`0x1E`, `0x1D`,
//! `0x1F`) or mnemonics (`^RS`, `^GS`, `^US`). Parsing and re-encoding in the
//! same [`Mode`] reproduces the input byte for byte.
//!
//! ## Example
//!
//! ```
//! use vipnt_rs::{Delimiters, Mode, QcStatus, Record};
//!
//! let delims = Delimiters::new(Mode::RawControl);
//! let chunk = b"2P000000001\x1F00986642836\x1F000000\x1F0002        \x1DJOHN SMITH\x1D1 MAIN ST";
//!
//! let mut record = Record::parse(chunk, &delims, true).unwrap();
//! record.set_record_number(1492);
//! record.ensure_qc_field(QcStatus::Clear);
//! record.set_qc_status(QcStatus::Flagged);
//!
//! assert_eq!(
//!     record.to_bytes(&delims),
//!     b"\x1E2P000001492\x1F00986642836\x1F000000\x1F0002        \x1FQ\x1DJOHN SMITH\x1D1 MAIN ST"
//! );
//! ```

pub mod control;
pub mod delimiter;
pub mod error;
pub mod reader;
pub mod record;
pub mod text;
pub mod tokenizer;
pub mod writer;

pub use control::{ControlSegment, QcStatus};
pub use delimiter::{Delimiter, Delimiters, Mode};
pub use error::{Error, RecordError, RecordResult, Result};
pub use reader::{Position, PositionedRecord, RecordReader};
pub use record::{Record, TextArea};
pub use text::{Anchor, TextMessage, TextSegment};
pub use tokenizer::{DEFAULT_BLOCK_SIZE, EOF_SENTINEL, EofPolicy, Tokenizer};
pub use writer::{
    ModeSelection, RecordWriter, RewriteOptions, RewriteSummary, destination_for, rewrite,
    rewrite_file,
};
