//! Streaming delimiter tokenizer.
//!
//! Reads a source in fixed-size blocks and yields the pieces between
//! occurrences of a (possibly multi-byte) delimiter. Only one block plus the
//! unfinished token is buffered at a time. A delimiter that straddles two
//! blocks is still recognised as one delimiter.
//!
//! What happens at end of stream is chosen with [`EofPolicy`].

use std::io::{self, Read};

/// Default read block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 2048;

/// Token emitted by [`EofPolicy::Sentinel`] when the source is exhausted.
pub const EOF_SENTINEL: &[u8] = b"^EOF";

/// End-of-stream behaviour of a [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// Emit the trailing remainder only when it is non-empty, and drop one
    /// empty token caused by a delimiter at the very start of the stream.
    ///
    /// This is what record streaming uses.
    #[default]
    Trimmed,
    /// Emit [`EOF_SENTINEL`], then the trailing remainder even when empty.
    ///
    /// Kept for tools that rely on the legacy marker. The remainder arriving
    /// after the sentinel is preserved as-is.
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Draining,
    SentinelSent,
    Done,
}

/// Lazy iterator over the delimiter-separated tokens of a reader.
///
/// The iterator is not restartable. Dropping it early leaves the reader
/// positioned somewhere after the last token returned; recover the reader
/// with [`Tokenizer::into_inner`] if it needs explicit closing.
#[derive(Debug)]
pub struct Tokenizer<R> {
    reader: R,
    delimiter: Vec<u8>,
    policy: EofPolicy,
    block: Vec<u8>,
    pending: Vec<u8>,
    // Offset in `pending` before which no delimiter can start.
    scan_from: usize,
    emitted: bool,
    state: State,
}

impl<R: Read> Tokenizer<R> {
    /// Tokenize `reader` on `delimiter` using [`DEFAULT_BLOCK_SIZE`] blocks.
    pub fn new(reader: R, delimiter: impl Into<Vec<u8>>, policy: EofPolicy) -> Self {
        Self::with_block_size(reader, delimiter, policy, DEFAULT_BLOCK_SIZE)
    }

    /// Tokenize with an explicit block size. A zero block size is raised to 1.
    pub fn with_block_size(
        reader: R,
        delimiter: impl Into<Vec<u8>>,
        policy: EofPolicy,
        block_size: usize,
    ) -> Self {
        Self {
            reader,
            delimiter: delimiter.into(),
            policy,
            block: vec![0; block_size.max(1)],
            pending: Vec::new(),
            scan_from: 0,
            emitted: false,
            state: State::Reading,
        }
    }

    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    pub fn policy(&self) -> EofPolicy {
        self.policy
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Take the next complete token out of `pending`, if one is buffered.
    fn take_buffered(&mut self) -> Option<Vec<u8>> {
        if self.delimiter.is_empty() {
            return None;
        }
        let offset = crate::delimiter::find(&self.pending[self.scan_from..], &self.delimiter)?;
        let end = self.scan_from + offset;
        let token = self.pending[..end].to_vec();
        self.pending.drain(..end + self.delimiter.len());
        self.scan_from = 0;
        Some(token)
    }

    /// Read one block into `pending`. Returns `false` at end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        let n = loop {
            match self.reader.read(&mut self.block) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            return Ok(false);
        }
        // A delimiter may begin in the tail of what is already buffered.
        self.scan_from = self
            .pending
            .len()
            .saturating_sub(self.delimiter.len().saturating_sub(1));
        self.pending.extend_from_slice(&self.block[..n]);
        Ok(true)
    }

    fn finish(&mut self) -> Option<Vec<u8>> {
        match (self.policy, self.state) {
            (EofPolicy::Trimmed, _) => {
                self.state = State::Done;
                if self.pending.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.pending))
                }
            }
            (EofPolicy::Sentinel, State::Draining) => {
                self.state = State::SentinelSent;
                Some(EOF_SENTINEL.to_vec())
            }
            (EofPolicy::Sentinel, _) => {
                self.state = State::Done;
                Some(std::mem::take(&mut self.pending))
            }
        }
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Done => return None,
                State::Draining | State::SentinelSent => return self.finish().map(Ok),
                State::Reading => {}
            }

            if let Some(token) = self.take_buffered() {
                let first = !self.emitted;
                self.emitted = true;
                if first && token.is_empty() && self.policy == EofPolicy::Trimmed {
                    continue;
                }
                return Some(Ok(token));
            }

            match self.fill() {
                Ok(true) => {}
                Ok(false) => self.state = State::Draining,
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
    }
}
