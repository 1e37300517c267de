//! FASTQ streaming parser and writer
//!
//! # Format
//!
//! ```text
//! @r1 optional description
//! GATTACA
//! +
//! IIIIIII
//! ```
//!
//! Parsing is split in two layers:
//!
//! - [`FastqRawStream`] frames records into `(title, sequence, quality)`
//!   strings without looking at the quality encoding.
//! - [`FastqStream`] decodes the quality string with a [`QualityEncoding`]
//!   and yields [`SeqRecord`]s.
//!
//! Sequence and quality may be wrapped over several lines. Wrapped quality
//! lines are collected until they reach the sequence length, since `@` and
//! `+` are valid quality characters.

use crate::error::{FastqualError, Result};
use crate::io::compression::{CompressedReader, CompressedWriter, DataSource};
use crate::io::DataSink;
use crate::quality::QualityEncoding;
use crate::types::{split_title, RawFastqRecord, SeqRecord, TitleParser};
use log::debug;
use std::io::{BufRead, Write};
use std::path::Path;

/// Framing-only FASTQ parser
///
/// Yields [`RawFastqRecord`]s. Lines are framed as bytes; the quality string
/// is checked for length only and decoding is left to the caller (see
/// [`FastqStream`]). Only the title has to be valid UTF-8.
///
/// After the first error the stream is exhausted.
pub struct FastqRawStream<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_number: usize,
    records_read: usize,
    finished: bool,
}

impl<R: BufRead> FastqRawStream<R> {
    /// Create a raw FASTQ stream from a buffered reader
    ///
    /// The stream takes ownership of `reader`. Pass `&mut reader` to keep a
    /// caller-owned handle open after the stream is dropped.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(256),
            line_number: 0,
            records_read: 0,
            finished: false,
        }
    }

    /// Number of records framed so far
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Current line number (1-based, last line read)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line into `self.line`; `false` at end of input
    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    fn error(&self, line: usize, msg: String) -> FastqualError {
        FastqualError::InvalidFastqFormat { line, msg }
    }

    fn read_record(&mut self) -> Result<Option<RawFastqRecord>> {
        // Header, tolerating blank lines only at the very end
        let mut blank_line = None;
        loop {
            if !self.next_line()? {
                return Ok(None);
            }
            if !self.line.trim_ascii().is_empty() {
                break;
            }
            blank_line.get_or_insert(self.line_number);
        }
        if let Some(line) = blank_line {
            return Err(self.error(line, "Blank line before record".to_string()));
        }

        let header = self.line.trim_ascii_end();
        let Some(title) = header.strip_prefix(b"@") else {
            return Err(self.error(
                self.line_number,
                format!(
                    "Expected '@' at start of header, got: {}",
                    String::from_utf8_lossy(header)
                ),
            ));
        };
        let Ok(title) = String::from_utf8(title.to_vec()) else {
            return Err(self.error(self.line_number, "Header is not valid UTF-8".to_string()));
        };
        let header_line = self.line_number;

        let mut sequence = Vec::new();
        loop {
            if !self.next_line()? {
                return Err(self.error(
                    self.line_number,
                    format!("Unexpected end of file in sequence of record {:?}", title),
                ));
            }
            if self.line.starts_with(b"+") {
                break;
            }
            if self.line.starts_with(b"@") {
                return Err(self.error(
                    self.line_number,
                    format!(
                        "Expected '+' separator for record starting at line {}, got: {}",
                        header_line,
                        String::from_utf8_lossy(self.line.trim_ascii_end())
                    ),
                ));
            }
            sequence.extend_from_slice(self.line.trim_ascii_end());
        }

        let repeated = self.line[1..].trim_ascii_end();
        if !repeated.is_empty() && repeated != title.as_bytes() {
            return Err(self.error(
                self.line_number,
                format!(
                    "Sequence and quality captions differ: {:?} vs {:?}",
                    title,
                    String::from_utf8_lossy(repeated)
                ),
            ));
        }

        let mut quality = Vec::with_capacity(sequence.len());
        loop {
            if !self.next_line()? {
                return Err(self.error(
                    self.line_number,
                    format!(
                        "Unexpected end of file in quality of record {:?} ({} of {} characters)",
                        title,
                        quality.len(),
                        sequence.len()
                    ),
                ));
            }
            quality.extend_from_slice(self.line.trim_ascii_end());
            if quality.len() >= sequence.len() {
                break;
            }
        }

        if quality.len() != sequence.len() {
            return Err(self.error(
                self.line_number,
                format!(
                    "Sequence length ({}) != quality length ({}) in record {:?}",
                    sequence.len(),
                    quality.len(),
                    title
                ),
            ));
        }

        self.records_read += 1;
        Ok(Some(RawFastqRecord {
            title,
            sequence,
            quality,
        }))
    }
}

impl FastqRawStream<CompressedReader> {
    /// Create a raw FASTQ stream from a data source (gzip detected)
    pub fn new(source: DataSource) -> Result<Self> {
        Ok(Self::from_reader(CompressedReader::new(source)?))
    }

    /// Create a raw FASTQ stream from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSource::from_path(path))
    }
}

impl<R: BufRead> Iterator for FastqRawStream<R> {
    type Item = Result<RawFastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                debug!("FASTQ input exhausted after {} records", self.records_read);
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// FASTQ stream decoding qualities with a fixed [`QualityEncoding`]
///
/// # Example
///
/// ```no_run
/// use fastqual::{FastqStream, QualityEncoding};
///
/// # fn main() -> fastqual::Result<()> {
/// let stream = FastqStream::from_path("reads.fq.gz", QualityEncoding::Sanger)?;
///
/// for record in stream {
///     let record = record?;
///     println!("{}: {} bp", record.id, record.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct FastqStream<R: BufRead> {
    raw: FastqRawStream<R>,
    encoding: QualityEncoding,
    title_parser: Option<TitleParser>,
    records_read: usize,
}

impl<R: BufRead> FastqStream<R> {
    /// Create a FASTQ stream from a buffered reader
    pub fn from_reader(reader: R, encoding: QualityEncoding) -> Self {
        Self {
            raw: FastqRawStream::from_reader(reader),
            encoding,
            title_parser: None,
            records_read: 0,
        }
    }

    /// Sanger / Phred+33 FASTQ
    pub fn sanger(reader: R) -> Self {
        Self::from_reader(reader, QualityEncoding::Sanger)
    }

    /// Solexa FASTQ (Solexa scores, offset 64)
    pub fn solexa(reader: R) -> Self {
        Self::from_reader(reader, QualityEncoding::Solexa)
    }

    /// Illumina 1.3+ FASTQ (Phred scores, offset 64)
    pub fn illumina(reader: R) -> Self {
        Self::from_reader(reader, QualityEncoding::Illumina)
    }

    /// Use a custom mapping from title line to `(id, description)`
    pub fn with_title_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> (String, String) + Send + 'static,
    {
        self.title_parser = Some(Box::new(parser));
        self
    }

    /// Encoding used to decode quality strings
    pub fn encoding(&self) -> QualityEncoding {
        self.encoding
    }

    /// Number of records decoded successfully so far
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn decode(&self, raw: RawFastqRecord) -> Result<SeqRecord> {
        let qualities = self.encoding.decode(&raw.quality)?;
        let (id, description) = match &self.title_parser {
            Some(parser) => parser(&raw.title),
            None => split_title(&raw.title),
        };
        Ok(SeqRecord {
            id,
            description,
            sequence: Some(raw.sequence),
            qualities,
        })
    }
}

impl FastqStream<CompressedReader> {
    /// Create a FASTQ stream from a data source (gzip detected)
    pub fn new(source: DataSource, encoding: QualityEncoding) -> Result<Self> {
        debug!("reading {source:?} as {encoding}");
        Ok(Self::from_reader(CompressedReader::new(source)?, encoding))
    }

    /// Create a FASTQ stream from a file path
    pub fn from_path<P: AsRef<Path>>(path: P, encoding: QualityEncoding) -> Result<Self> {
        Self::new(DataSource::from_path(path), encoding)
    }
}

impl<R: BufRead> Iterator for FastqStream<R> {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = match self.raw.next()? {
            Ok(raw) => raw,
            Err(e) => return Some(Err(e)),
        };
        let record = self.decode(raw);
        match record {
            Ok(_) => self.records_read += 1,
            Err(_) => self.raw.finished = true,
        }
        Some(record)
    }
}

/// FASTQ writer encoding qualities with a fixed [`QualityEncoding`]
///
/// Records are fully encoded before anything is written, so a record that
/// fails with [`FastqualError::EncodingRange`] leaves no partial output.
///
/// # Example
///
/// ```no_run
/// use fastqual::{FastqStream, FastqWriter, QualityEncoding};
/// use fastqual::io::DataSink;
///
/// # fn main() -> fastqual::Result<()> {
/// let input = FastqStream::from_path("old.fq", QualityEncoding::Illumina)?;
/// let mut writer = FastqWriter::new(DataSink::from_path("new.fq.gz"), QualityEncoding::Sanger)?;
/// for record in input {
///     writer.write_record(&record?)?;
/// }
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct FastqWriter<W: Write> {
    writer: W,
    encoding: QualityEncoding,
    buffer: Vec<u8>,
    records_written: usize,
}

impl<W: Write> FastqWriter<W> {
    /// Wrap any writer
    pub fn from_writer(writer: W, encoding: QualityEncoding) -> Self {
        Self {
            writer,
            encoding,
            buffer: Vec::with_capacity(1024),
            records_written: 0,
        }
    }

    /// Encoding used for quality strings
    pub fn encoding(&self) -> QualityEncoding {
        self.encoding
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Write one record
    pub fn write_record(&mut self, record: &SeqRecord) -> Result<()> {
        let sequence = record
            .sequence
            .as_deref()
            .ok_or_else(|| FastqualError::MissingSequence {
                id: record.id.clone(),
            })?;
        if sequence.len() != record.qualities.len() {
            return Err(FastqualError::LengthMismatch {
                id: record.id.clone(),
                sequence: sequence.len(),
                quality: record.qualities.len(),
            });
        }

        self.buffer.clear();
        self.buffer.push(b'@');
        self.buffer.extend_from_slice(record.title().as_bytes());
        self.buffer.push(b'\n');
        self.buffer.extend_from_slice(sequence);
        self.buffer.extend_from_slice(b"\n+\n");
        self.encoding.encode_into(&record.qualities, &mut self.buffer)?;
        self.buffer.push(b'\n');

        self.writer.write_all(&self.buffer)?;
        self.records_written += 1;
        Ok(())
    }

    /// Write every record from an iterator, stopping at the first error
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a SeqRecord>,
    {
        let before = self.records_written;
        for record in records {
            self.write_record(record)?;
        }
        Ok(self.records_written - before)
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl FastqWriter<CompressedWriter> {
    /// Create a writer for a sink (gzip chosen from the extension)
    pub fn new(sink: DataSink, encoding: QualityEncoding) -> Result<Self> {
        let writer = CompressedWriter::new(sink)?;
        Ok(Self::from_writer(writer, encoding))
    }

    /// Flush all data and finalize compression
    pub fn finish(self) -> Result<()> {
        debug!("FASTQ writer finished after {} records", self.records_written);
        self.writer.finish()?;
        Ok(())
    }
}
