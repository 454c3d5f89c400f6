//! Control area codec.
//!
//! The control area carries machine and routing metadata as up to eight
//! sub-fields separated by the unit delimiter:
//!
//! | # | field | layout |
//! |---|-------|--------|
//! | 1 | record number | `2P` + 9 digits |
//! | 2 | sort, consolidation, zip | 1 + 1 + rest |
//! | 3 | pallet ID | 6 digits |
//! | 4 | version / makeup name | 12 chars, left-justified |
//! | 5 | QC flag | `Q` or space, optional |
//! | 6 | signature map | bitmap string |
//! | 7 | message indicators | 8 x 3 chars |
//! | 8 | auxiliary device control | bit string |
//!
//! Sub-fields past the present count are absent, which is distinct from
//! present-but-empty. Setters keep the raw sub-field and the decoded view in
//! step, and ignore out-of-range input instead of failing.

use crate::delimiter::{self, Delimiters};
use crate::error::{RecordError, RecordResult};

/// Maximum number of control sub-fields.
pub const MAX_FIELDS: usize = 8;

/// Literal prefix of sub-field 1.
pub const RECORD_NUMBER_PREFIX: &[u8] = b"2P";

/// Largest record number that fits the 9-digit field.
pub const MAX_RECORD_NUMBER: u32 = 999_999_999;

/// Largest pallet ID that fits the 6-digit field.
pub const MAX_PALLET_ID: u32 = 999_999;

/// Width of the version / makeup name field.
pub const VERSION_WIDTH: usize = 12;

/// Accepted sort levels.
pub const SORT_CODES: [u8; 5] = [0, 1, 2, 3, 4];

/// Accepted consolidation levels.
pub const CONSOLIDATION_CODES: [u8; 3] = [0, 3, 5];

const RECORD_NUMBER: usize = 0;
const ROUTING: usize = 1;
const PALLET: usize = 2;
const VERSION: usize = 3;
const QC: usize = 4;
const SIGNATURE_MAP: usize = 5;
const MESSAGE_INDICATORS: usize = 6;
const AUX_DEVICE: usize = 7;

const MESSAGE_INDICATOR_WIDTH: usize = 3;
const MESSAGE_INDICATOR_COUNT: usize = 8;

/// Quality-control marker held in sub-field 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QcStatus {
    /// `Q`: pulled for inspection.
    Flagged,
    /// A single space.
    #[default]
    Clear,
}

impl QcStatus {
    /// Map a textual flag: exactly `"Q"` flags, anything else clears.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "Q" {
            QcStatus::Flagged
        } else {
            QcStatus::Clear
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            QcStatus::Flagged => b'Q',
            QcStatus::Clear => b' ',
        }
    }
}

/// Parsed control area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSegment {
    // Only present sub-fields are stored; `fields.len()` is the count.
    fields: Vec<Vec<u8>>,
    record_number: u32,
}

impl ControlSegment {
    /// Parse the control area of a record (everything before the first
    /// group delimiter, record delimiter excluded).
    pub fn parse(input: &[u8], delims: &Delimiters) -> RecordResult<Self> {
        let fields: Vec<Vec<u8>> = delimiter::split(input, delims.unit())
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();
        if fields.is_empty() || fields.len() > MAX_FIELDS {
            return Err(RecordError::InvalidControlSegmentCount {
                count: fields.len(),
            });
        }
        let record_number = decode_record_number(&fields[RECORD_NUMBER])?;
        Ok(Self {
            fields,
            record_number,
        })
    }

    /// Encode the present sub-fields into `out`.
    pub fn write_to(&self, out: &mut Vec<u8>, delims: &Delimiters) {
        delimiter::join_into(out, &self.fields, delims.unit());
    }

    pub fn to_bytes(&self, delims: &Delimiters) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out, delims);
        out
    }

    /// Number of present sub-fields, 1 to 8.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Raw sub-field by zero-based index, `None` when absent.
    pub fn field(&self, index: usize) -> Option<&[u8]> {
        self.fields.get(index).map(Vec::as_slice)
    }

    pub fn record_number(&self) -> u32 {
        self.record_number
    }

    /// Sort level digit from sub-field 2.
    pub fn sort_code(&self) -> Option<u8> {
        self.field(ROUTING)?.first().copied().and_then(digit_value)
    }

    /// Consolidation level digit from sub-field 2.
    pub fn consolidation_code(&self) -> Option<u8> {
        self.field(ROUTING)?.get(1).copied().and_then(digit_value)
    }

    /// Zip portion of sub-field 2, trailing padding included.
    pub fn zip(&self) -> Option<&[u8]> {
        self.field(ROUTING).map(|f| f.get(2..).unwrap_or_default())
    }

    pub fn pallet_id(&self) -> Option<&[u8]> {
        self.field(PALLET)
    }

    /// Version / makeup name with padding trimmed.
    pub fn version_id(&self) -> Option<&[u8]> {
        self.field(VERSION).map(<[u8]>::trim_ascii)
    }

    /// `None` until the QC sub-field exists.
    pub fn qc_status(&self) -> Option<QcStatus> {
        self.field(QC).map(|f| {
            if f == b"Q" {
                QcStatus::Flagged
            } else {
                QcStatus::Clear
            }
        })
    }

    pub fn signature_map(&self) -> Option<&[u8]> {
        self.field(SIGNATURE_MAP)
    }

    /// The three-character message indicator slots of sub-field 7.
    ///
    /// A short field yields fewer slots; the last one may be partial.
    pub fn message_indicators(&self) -> Option<Vec<&[u8]>> {
        self.field(MESSAGE_INDICATORS).map(|f| {
            f.chunks(MESSAGE_INDICATOR_WIDTH)
                .take(MESSAGE_INDICATOR_COUNT)
                .collect()
        })
    }

    pub fn aux_device_control(&self) -> Option<&[u8]> {
        self.field(AUX_DEVICE)
    }

    /// Rewrite sub-field 1 as `2P` plus the zero-padded number.
    ///
    /// Numbers wider than nine digits are ignored.
    pub fn set_record_number(&mut self, number: u32) -> bool {
        if number > MAX_RECORD_NUMBER {
            return false;
        }
        let mut field = RECORD_NUMBER_PREFIX.to_vec();
        field.extend_from_slice(format!("{number:09}").as_bytes());
        self.fields[RECORD_NUMBER] = field;
        self.record_number = number;
        true
    }

    /// Replace the first character of sub-field 2.
    ///
    /// Ignored unless `code` is one of [`SORT_CODES`] and the field exists.
    pub fn set_sort_code(&mut self, code: u8) -> bool {
        if !SORT_CODES.contains(&code) {
            return false;
        }
        self.replace_routing_byte(0, code)
    }

    /// Replace the second character of sub-field 2.
    ///
    /// Ignored unless `code` is one of [`CONSOLIDATION_CODES`] and the field exists.
    pub fn set_consolidation_code(&mut self, code: u8) -> bool {
        if !CONSOLIDATION_CODES.contains(&code) {
            return false;
        }
        self.replace_routing_byte(1, code)
    }

    fn replace_routing_byte(&mut self, at: usize, code: u8) -> bool {
        let Some(field) = self.fields.get_mut(ROUTING) else {
            return false;
        };
        let digit = b'0' + code;
        if at < field.len() {
            field[at] = digit;
        } else if at == field.len() {
            field.push(digit);
        } else {
            // No sort code to keep the consolidation code in position.
            return false;
        }
        true
    }

    /// Rewrite sub-field 3 as a 6-digit zero-padded number.
    pub fn set_pallet_id(&mut self, id: u32) -> bool {
        if id > MAX_PALLET_ID {
            return false;
        }
        self.replace_field(PALLET, format!("{id:06}").into_bytes())
    }

    /// Rewrite sub-field 4, left-justified and space-padded to 12 bytes.
    ///
    /// Ignored when `id` encodes to more than 12 bytes.
    pub fn set_version_id(&mut self, id: &str) -> bool {
        if id.len() > VERSION_WIDTH {
            return false;
        }
        let mut field = id.as_bytes().to_vec();
        field.resize(VERSION_WIDTH, b' ');
        self.replace_field(VERSION, field)
    }

    /// Append the QC sub-field when exactly four sub-fields are present.
    ///
    /// Returns whether the field was added.
    pub fn ensure_qc_field(&mut self, default: QcStatus) -> bool {
        if self.fields.len() != QC {
            return false;
        }
        self.fields.push(vec![default.as_byte()]);
        true
    }

    /// Store the QC marker. The QC sub-field must already exist.
    pub fn set_qc_status(&mut self, status: QcStatus) -> bool {
        self.replace_field(QC, vec![status.as_byte()])
    }

    fn replace_field(&mut self, index: usize, value: Vec<u8>) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                *field = value;
                true
            }
            None => false,
        }
    }
}

// The two prefix bytes are skipped, not checked; only the digits must be valid.
fn decode_record_number(field: &[u8]) -> RecordResult<u32> {
    let invalid = || RecordError::InvalidRecordNumber {
        value: String::from_utf8_lossy(field).into_owned(),
    };
    let digits = field.get(RECORD_NUMBER_PREFIX.len()..).ok_or_else(invalid)?;
    std::str::from_utf8(digits)
        .ok()
        .map(str::trim)
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)
}

fn digit_value(b: u8) -> Option<u8> {
    b.is_ascii_digit().then(|| b - b'0')
}
