//! A single production record.
//!
//! ```text
//! RS control (US control){0,7} GS line ... (US GS line ...){0,19}
//! ```
//!
//! The control area runs up to the first group delimiter. That delimiter
//! belongs to the text area, which may be kept as opaque bytes when the
//! caller only needs to touch control fields.

use crate::control::{ControlSegment, QcStatus};
use crate::delimiter::{self, Delimiters};
use crate::error::{RecordError, RecordResult};
use crate::text::{Anchor, TextSegment};

/// Text area of a record, parsed or left as found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextArea {
    /// Unparsed bytes, leading group delimiter included.
    Raw(Vec<u8>),
    Parsed(TextSegment),
}

/// One production record.
///
/// # Example
///
/// ```
/// use vipnt_rs::{Delimiters, Mode, Record};
///
/// let delims = Delimiters::new(Mode::Mnemonic);
/// let input = b"2P000000001^US00986642836^US000000^US0002        ^GSLINE 1";
/// let mut record = Record::parse(input, &delims, true).unwrap();
/// record.set_pallet_id(42);
/// assert_eq!(
///     record.to_bytes(&delims),
///     b"^RS2P000000001^US00986642836^US000042^US0002        ^GSLINE 1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    control: ControlSegment,
    text: TextArea,
}

impl Record {
    /// Parse one record as produced by splitting a stream on the record
    /// delimiter (so without the leading record delimiter).
    ///
    /// With `parse_text` false the text area is kept opaque and only
    /// validated later by [`Record::parse_text`].
    pub fn parse(chunk: &[u8], delims: &Delimiters, parse_text: bool) -> RecordResult<Self> {
        let (control, rest) =
            delimiter::split_once(chunk, delims.group()).ok_or(RecordError::MissingTextArea)?;
        let control = ControlSegment::parse(control, delims)?;

        // The first group delimiter opens the text area; put it back.
        let mut raw = Vec::with_capacity(delims.group().len() + rest.len());
        raw.extend_from_slice(delims.group());
        raw.extend_from_slice(rest);

        let text = if parse_text {
            TextArea::Parsed(TextSegment::parse(&raw, delims)?)
        } else {
            TextArea::Raw(raw)
        };
        Ok(Self { control, text })
    }

    /// Parse an opaque text area in place. A no-op when already parsed.
    ///
    /// On failure the text area stays opaque.
    pub fn parse_text(&mut self, delims: &Delimiters) -> RecordResult<()> {
        if let TextArea::Raw(raw) = &self.text {
            let segment = TextSegment::parse(raw, delims)?;
            self.text = TextArea::Parsed(segment);
        }
        Ok(())
    }

    /// Append the encoded record, record delimiter first.
    pub fn write_to(&self, out: &mut Vec<u8>, delims: &Delimiters) {
        out.extend_from_slice(delims.record());
        self.control.write_to(out, delims);
        match &self.text {
            TextArea::Raw(raw) => out.extend_from_slice(raw),
            TextArea::Parsed(segment) => segment.write_to(out, delims),
        }
    }

    pub fn to_bytes(&self, delims: &Delimiters) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out, delims);
        out
    }

    pub fn control(&self) -> &ControlSegment {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut ControlSegment {
        &mut self.control
    }

    pub fn text(&self) -> &TextArea {
        &self.text
    }

    /// The parsed text segment, `None` while the text area is opaque.
    pub fn text_segment(&self) -> Option<&TextSegment> {
        match &self.text {
            TextArea::Parsed(segment) => Some(segment),
            TextArea::Raw(_) => None,
        }
    }

    pub fn text_segment_mut(&mut self) -> Option<&mut TextSegment> {
        match &mut self.text {
            TextArea::Parsed(segment) => Some(segment),
            TextArea::Raw(_) => None,
        }
    }

    pub fn set_record_number(&mut self, number: u32) -> bool {
        self.control.set_record_number(number)
    }

    pub fn set_sort_code(&mut self, code: u8) -> bool {
        self.control.set_sort_code(code)
    }

    pub fn set_consolidation_code(&mut self, code: u8) -> bool {
        self.control.set_consolidation_code(code)
    }

    pub fn set_pallet_id(&mut self, id: u32) -> bool {
        self.control.set_pallet_id(id)
    }

    pub fn set_version_id(&mut self, id: &str) -> bool {
        self.control.set_version_id(id)
    }

    pub fn ensure_qc_field(&mut self, default: QcStatus) -> bool {
        self.control.ensure_qc_field(default)
    }

    pub fn set_qc_status(&mut self, status: QcStatus) -> bool {
        self.control.set_qc_status(status)
    }

    /// Float every text message, parsing the text area first if needed.
    pub fn float_text(&mut self, anchor: Anchor, delims: &Delimiters) -> RecordResult<()> {
        self.parse_text(delims)?;
        if let Some(segment) = self.text_segment_mut() {
            segment.float_all(anchor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::Mode;

    const RAW: Delimiters = Delimiters::new(Mode::RawControl);
    const MNEMONIC: Delimiters = Delimiters::new(Mode::Mnemonic);

    const SAMPLE: &[u8] = b"\x1E2P000000001\x1F00986642836   \x1F000000\x1F0002        \x1F \
        \x1D#BXNGMLS *********CAR-RT LOT**C-026\
        \x1D#0894000064221822# FEB07\
        \x1DDE2 BLIF1SZ JAN06 0002        #1 #1\
        \x1DBRUCE BROMBEREK              ^ISC^X\
        \x1D8900 SE HILLCREST DR\
        \x1DVANCOUVER WA  98664-2836\x1D\x1DBECDECBCEDCDECDBCDCBCBCDEE\
        \x1F\x1D@nd Message\x1D\x1D\x1D\x1D\x1D\x1D\x1DLine 8";

    const SAMPLE_MNEMONIC: &[u8] = b"^RS2P000000001^US00986642836   ^US000000^US0002        ^US \
        ^GS#BXNGMLS *********CAR-RT LOT**C-026\
        ^GS#0894000064221822# FEB07\
        ^GSDE2 BLIF1SZ JAN06 0002        #1 #1\
        ^GSBRUCE BROMBEREK              ^ISC^X\
        ^GS8900 SE HILLCREST DR\
        ^GSVANCOUVER WA  98664-2836^GS^GSBECDECBCEDCDECDBCDCBCBCDEE\
        ^US^GS@nd Message^GS^GS^GS^GS^GS^GS^GSLine 8";

    const UPDATED: &[u8] = b"\x1E2P000001492\x1F43986642836   \x1F000042\x1F0202        \x1FQ\
        \x1D#BXNGMLS *********CAR-RT LOT**C-026\
        \x1D#0894000064221822# FEB07\
        \x1DDE2 BLIF1SZ JAN06 0002        #1 #1\
        \x1DBRUCE BROMBEREK              ^ISC^X\
        \x1D8900 SE HILLCREST DR\
        \x1DVANCOUVER WA  98664-2836\x1D\x1DBECDECBCEDCDECDBCDCBCBCDEE\
        \x1F\x1D@nd Message\x1D\x1D\x1D\x1D\x1D\x1D\x1DLine 8";

    #[test]
    fn test_round_trip_raw() {
        let record = Record::parse(&SAMPLE[1..], &RAW, true).unwrap();
        assert_eq!(record.control().version_id(), Some(&b"0002"[..]));
        assert_eq!(record.to_bytes(&RAW), SAMPLE);
    }

    #[test]
    fn test_round_trip_mnemonic() {
        let record = Record::parse(&SAMPLE_MNEMONIC[3..], &MNEMONIC, true).unwrap();
        assert_eq!(record.to_bytes(&MNEMONIC), SAMPLE_MNEMONIC);
    }

    #[test]
    fn test_modes_decode_identically() {
        let raw = Record::parse(&SAMPLE[1..], &RAW, true).unwrap();
        let mnemonic = Record::parse(&SAMPLE_MNEMONIC[3..], &MNEMONIC, true).unwrap();
        assert_eq!(raw, mnemonic);
        // Converting between modes is just re-encoding.
        assert_eq!(raw.to_bytes(&MNEMONIC), SAMPLE_MNEMONIC);
        assert_eq!(mnemonic.to_bytes(&RAW), SAMPLE);
    }

    #[test]
    fn test_field_updates() {
        let mut record = Record::parse(&SAMPLE[1..], &RAW, true).unwrap();
        assert!(record.set_pallet_id(42));
        assert!(record.set_version_id("0202"));
        assert!(record.set_qc_status(QcStatus::from_flag("Q")));
        assert!(record.set_sort_code(4));
        assert!(record.set_consolidation_code(3));
        assert!(record.set_record_number(1492));
        assert_eq!(record.to_bytes(&RAW), UPDATED);
    }

    #[test]
    fn test_float_text_top() {
        let mut record = Record::parse(&UPDATED[1..], &RAW, false).unwrap();
        record.float_text(Anchor::Top, &RAW).unwrap();
        let text = record.text_segment().unwrap();
        assert_eq!(text.messages()[0].lines().len(), 16);
        assert!(text.messages()[0].lines()[..8].iter().all(Vec::is_empty));
        assert_eq!(text.messages()[1].lines()[8], b"@nd Message");
    }

    #[test]
    fn test_missing_text_area() {
        assert_eq!(
            Record::parse(b"2P000000001\x1F00", &RAW, true),
            Err(RecordError::MissingTextArea)
        );
        // The mnemonic group delimiter is not recognised in raw mode.
        assert_eq!(
            Record::parse(b"2P000000001^GSLINE", &RAW, false),
            Err(RecordError::MissingTextArea)
        );
    }

    #[test]
    fn test_control_errors_propagate() {
        assert_eq!(
            Record::parse(b"2P000000001^US^US^US^US^US^US^US^US^GSx", &MNEMONIC, false),
            Err(RecordError::InvalidControlSegmentCount { count: 9 })
        );
    }

    #[test]
    fn test_opaque_text_round_trip_and_deferred_parse() {
        let twenty_one = vec!["^GSx"; 21].join("^US");
        let chunk = format!("2P000000001{twenty_one}");
        let mut record = Record::parse(chunk.as_bytes(), &MNEMONIC, false).unwrap();
        assert!(record.text_segment().is_none());

        let mut expected = b"^RS".to_vec();
        expected.extend_from_slice(chunk.as_bytes());
        assert_eq!(record.to_bytes(&MNEMONIC), expected);

        assert_eq!(
            record.parse_text(&MNEMONIC),
            Err(RecordError::TooManyTextMessages { count: 21 })
        );
        assert!(matches!(record.text(), TextArea::Raw(_)));
    }

    #[test]
    fn test_parse_text_is_idempotent() {
        let mut record = Record::parse(&SAMPLE[1..], &RAW, false).unwrap();
        record.parse_text(&RAW).unwrap();
        record.parse_text(&RAW).unwrap();
        assert_eq!(record.text_segment().unwrap().messages().len(), 2);
        assert_eq!(record.to_bytes(&RAW), SAMPLE);
    }
}
