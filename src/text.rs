//! Text area codec.
//!
//! The text area is a list of messages separated by the unit delimiter. Each
//! message is a list of lines, every line preceded by a group delimiter:
//!
//! ```text
//! GS line GS line ... US GS line GS line ...
//! ```

use crate::delimiter::{self, Delimiters};
use crate::error::{RecordError, RecordResult};

/// Maximum number of messages in one text area.
pub const MAX_MESSAGES: usize = 20;

/// Maximum number of lines in one message.
pub const MAX_LINES_PER_MESSAGE: usize = 144;

/// Maximum number of lines across the whole text area.
pub const MAX_TOTAL_LINES: usize = 720;

/// Which end of the print slot the existing lines stay anchored to when
/// floating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Blank lines go before the content.
    Top,
    /// Blank lines go after the content.
    Bottom,
}

/// One message: a slot of printed lines, such as an address block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextMessage {
    // Bytes ahead of the first group delimiter; empty in well-formed input.
    preamble: Vec<u8>,
    lines: Vec<Vec<u8>>,
}

impl TextMessage {
    pub fn new(lines: Vec<Vec<u8>>) -> Self {
        Self {
            preamble: Vec::new(),
            lines,
        }
    }

    fn parse(input: &[u8], delims: &Delimiters) -> Self {
        let mut pieces = delimiter::split(input, delims.group()).into_iter();
        let preamble = pieces.next().unwrap_or_default().to_vec();
        Self {
            preamble,
            lines: pieces.map(<[u8]>::to_vec).collect(),
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>, delims: &Delimiters) {
        out.extend_from_slice(&self.preamble);
        for line in &self.lines {
            out.extend_from_slice(delims.group());
            out.extend_from_slice(line);
        }
    }

    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<Vec<u8>> {
        &mut self.lines
    }

    /// Double the line count with blank lines, keeping content at `anchor`.
    pub fn float(&mut self, anchor: Anchor) {
        let mut blanks = vec![Vec::new(); self.lines.len()];
        match anchor {
            Anchor::Top => {
                blanks.append(&mut self.lines);
                self.lines = blanks;
            }
            Anchor::Bottom => self.lines.extend(blanks),
        }
    }

    /// Lines joined with tabs, delimiters dropped.
    pub fn to_tab_separated(&self) -> Vec<u8> {
        let mut out = Vec::new();
        delimiter::join_into(&mut out, &self.lines, b"\t");
        out
    }
}

/// Parsed text area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    messages: Vec<TextMessage>,
}

impl TextSegment {
    /// Parse a text area, leading group delimiter included.
    pub fn parse(input: &[u8], delims: &Delimiters) -> RecordResult<Self> {
        let groups = delimiter::split(input, delims.unit());
        if groups.len() > MAX_MESSAGES {
            return Err(RecordError::TooManyTextMessages {
                count: groups.len(),
            });
        }

        let mut total = 0;
        let mut messages = Vec::with_capacity(groups.len());
        for (index, group) in groups.into_iter().enumerate() {
            let message = TextMessage::parse(group, delims);
            let count = message.lines.len();
            if count > MAX_LINES_PER_MESSAGE {
                return Err(RecordError::TooManyLinesInMessage {
                    message: index,
                    count,
                });
            }
            total += count;
            if total > MAX_TOTAL_LINES {
                return Err(RecordError::TooManyLinesTotal { count: total });
            }
            messages.push(message);
        }

        Ok(Self { messages })
    }

    pub fn write_to(&self, out: &mut Vec<u8>, delims: &Delimiters) {
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(delims.unit());
            }
            message.write_to(out, delims);
        }
    }

    pub fn to_bytes(&self, delims: &Delimiters) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out, delims);
        out
    }

    pub fn messages(&self) -> &[TextMessage] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut [TextMessage] {
        &mut self.messages
    }

    pub fn line_count(&self) -> usize {
        self.messages.iter().map(|m| m.lines.len()).sum()
    }

    /// Float every message in order.
    pub fn float_all(&mut self, anchor: Anchor) {
        for message in &mut self.messages {
            message.float(anchor);
        }
    }

    /// Messages joined with tabs, each rendered by
    /// [`TextMessage::to_tab_separated`].
    pub fn to_tab_separated(&self) -> Vec<u8> {
        let rendered: Vec<Vec<u8>> = self
            .messages
            .iter()
            .map(TextMessage::to_tab_separated)
            .collect();
        let mut out = Vec::new();
        delimiter::join_into(&mut out, &rendered, b"\t");
        out
    }
}
