//! Writing records and rewriting whole files.
//!
//! [`rewrite`] streams every record of a source to a sink, renumbering the
//! records from 1 and making sure each carries a QC sub-field. The source
//! delimiter mode is kept. The first malformed record aborts the rewrite.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::control::QcStatus;
use crate::delimiter::{Delimiter, Delimiters, Mode};
use crate::error::{Error, Result};
use crate::reader::{PositionedRecord, RecordReader};
use crate::record::Record;
use crate::tokenizer::DEFAULT_BLOCK_SIZE;

/// Emit a progress event every this many records.
const PROGRESS_INTERVAL: usize = 1000;

/// Serializes records into a byte sink.
pub struct RecordWriter<W: Write> {
    sink: W,
    delims: Delimiters,
    buf: Vec<u8>,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W, delims: Delimiters) -> Self {
        Self {
            sink,
            delims,
            buf: Vec::new(),
            written: 0,
        }
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.buf.clear();
        record.write_to(&mut self.buf, &self.delims);
        self.sink
            .write_all(&self.buf)
            .map_err(|source| Error::Write { source })?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(|source| Error::Write { source })
    }

    /// Flush and give back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }
}

/// How the delimiter mode of a source is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSelection {
    /// Look at the first bytes of the source (see [`Mode::detect`]).
    #[default]
    Auto,
    Fixed(Mode),
}

/// Settings for [`rewrite`] and [`rewrite_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    pub mode: ModeSelection,
    /// Read block size for the tokenizer.
    pub block_size: usize,
    /// Value given to a QC sub-field that has to be added.
    pub qc_default: QcStatus,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            mode: ModeSelection::Auto,
            block_size: DEFAULT_BLOCK_SIZE,
            qc_default: QcStatus::Clear,
        }
    }
}

/// Outcome of a successful rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteSummary {
    pub records: usize,
    pub mode: Mode,
}

/// Renumber and rewrite every record of `source` into `sink`.
pub fn rewrite<R: Read, W: Write>(
    mut source: R,
    sink: W,
    options: &RewriteOptions,
) -> Result<RewriteSummary> {
    let mut head = Vec::new();
    let mode = match options.mode {
        ModeSelection::Fixed(mode) => mode,
        ModeSelection::Auto => {
            read_head(&mut source, &mut head)?;
            Mode::detect(&head)
        }
    };
    // Bytes consumed for detection go back in front of the stream.
    let source = Cursor::new(head).chain(source);
    debug!(%mode, "rewriting record stream");

    let delims = Delimiters::new(mode);
    let reader = RecordReader::with_block_size(source, delims, false, options.block_size);
    let mut writer = RecordWriter::new(sink, delims);

    for item in reader {
        let PositionedRecord { index, mut record, .. } = item?;
        // Numbers past the 9-digit field leave the existing number in place.
        record.set_record_number(u32::try_from(index).unwrap_or(u32::MAX));
        record.ensure_qc_field(options.qc_default);
        writer.write_record(&record)?;
        if index % PROGRESS_INTERVAL == 0 {
            debug!(records = index, "progress");
        }
    }
    writer.flush()?;

    Ok(RewriteSummary {
        records: writer.written(),
        mode,
    })
}

/// Rewrite the file at `source` into `dest`, creating parent directories.
///
/// On a malformed record the records before it have already been written to
/// `dest`.
pub fn rewrite_file(
    source: &Path,
    dest: &Path,
    options: &RewriteOptions,
) -> Result<RewriteSummary> {
    let input = File::open(source).map_err(|e| Error::io(source, e))?;

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let output = File::create(dest).map_err(|e| Error::io(dest, e))?;

    let summary = rewrite(input, BufWriter::new(output), options)?;
    info!(
        source = %source.display(),
        dest = %dest.display(),
        records = summary.records,
        mode = %summary.mode,
        "rewrote file"
    );
    Ok(summary)
}

/// Read enough of `source` to tell the modes apart, tolerating short reads.
fn read_head<R: Read>(source: &mut R, head: &mut Vec<u8>) -> Result<()> {
    let len = Delimiter::Record.bytes(Mode::Mnemonic).len() as u64;
    source
        .by_ref()
        .take(len)
        .read_to_end(head)
        .map_err(|source| Error::Read { source })?;
    Ok(())
}

/// Destination of `source` inside `out_dir`: same file name, new directory.
pub fn destination_for(source: &Path, out_dir: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| out_dir.join(name))
}
