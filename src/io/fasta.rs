//! FASTA streaming parser and writer
//!
//! # Format
//!
//! ```text
//! >sequence1 description
//! GATTACAGATTACA
//! TGCATGCA
//! >sequence2
//! ACGTACGT
//! ```
//!
//! Sequences may be wrapped over any number of lines; blank lines inside a
//! record are skipped. A record with no sequence lines is an empty sequence.

use crate::error::{FastqualError, Result};
use crate::io::compression::{CompressedReader, CompressedWriter, DataSource};
use crate::io::DataSink;
use crate::types::{split_title, FastaRecord, TitleParser};
use log::debug;
use std::io::{BufRead, Write};
use std::path::Path;

/// Default residues/scores per output line
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// FASTA streaming parser
///
/// # Example
///
/// ```no_run
/// use fastqual::FastaStream;
///
/// let stream = FastaStream::from_path("reads.fa.gz")?;
/// for record in stream {
///     let record = record?;
///     println!("{}: {} bp", record.id, record.sequence.len());
/// }
/// # Ok::<(), fastqual::FastqualError>(())
/// ```
pub struct FastaStream<R: BufRead> {
    reader: R,
    line_buffer: Vec<u8>,
    line_number: usize,
    finished: bool,
    /// Header of the next record and its line, read while finishing the previous one
    next_header: Option<(Vec<u8>, usize)>,
    title_parser: Option<TitleParser>,
}

impl FastaStream<CompressedReader> {
    /// Create a FASTA stream from a data source (gzip detected)
    pub fn new(source: DataSource) -> Result<Self> {
        debug!("reading {source:?} as FASTA");
        Ok(Self::from_reader(CompressedReader::new(source)?))
    }

    /// Create a FASTA stream from a local file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSource::from_path(path))
    }
}

impl<R: BufRead> FastaStream<R> {
    /// Create a FASTA stream from any buffered reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_buffer: Vec::with_capacity(256),
            line_number: 0,
            finished: false,
            next_header: None,
            title_parser: None,
        }
    }

    /// Use a custom mapping from title line to `(id, description)`
    pub fn with_title_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> (String, String) + Send + 'static,
    {
        self.title_parser = Some(Box::new(parser));
        self
    }

    fn next_line(&mut self) -> Result<bool> {
        self.line_buffer.clear();
        if self.reader.read_until(b'\n', &mut self.line_buffer)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    /// Read a single FASTA record
    fn read_record(&mut self) -> Result<Option<FastaRecord>> {
        let (header, header_line) = match self.next_header.take() {
            Some(header) => header,
            None => loop {
                if !self.next_line()? {
                    return Ok(None);
                }
                let line = self.line_buffer.trim_ascii();
                if !line.is_empty() {
                    break (line.to_vec(), self.line_number);
                }
            },
        };

        let Some(title) = header.strip_prefix(b">") else {
            return Err(FastqualError::InvalidFastaFormat {
                line: header_line,
                msg: format!(
                    "Expected '>' at start of header, got: {}",
                    String::from_utf8_lossy(&header)
                ),
            });
        };
        let Ok(title) = std::str::from_utf8(title) else {
            return Err(FastqualError::InvalidFastaFormat {
                line: header_line,
                msg: "Header is not valid UTF-8".to_string(),
            });
        };

        let (id, description) = match &self.title_parser {
            Some(parser) => parser(title),
            None => split_title(title),
        };

        let mut sequence = Vec::new();
        while self.next_line()? {
            let line = self.line_buffer.trim_ascii();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(b">") {
                self.next_header = Some((line.to_vec(), self.line_number));
                break;
            }
            sequence.extend_from_slice(line);
        }

        Ok(Some(FastaRecord::new(id, description, sequence)))
    }
}

impl<R: BufRead> Iterator for FastaStream<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// FASTA writer with fixed-width sequence lines
pub struct FastaWriter<W: Write> {
    writer: W,
    line_width: usize,
    records_written: usize,
}

impl<W: Write> FastaWriter<W> {
    /// Wrap any writer, using [`DEFAULT_LINE_WIDTH`]
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer,
            line_width: DEFAULT_LINE_WIDTH,
            records_written: 0,
        }
    }

    /// Set the line width; 0 writes each sequence on a single line
    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Write one record from its title and sequence
    pub fn write_sequence(&mut self, title: &str, sequence: &[u8]) -> Result<()> {
        self.writer.write_all(b">")?;
        self.writer.write_all(title.as_bytes())?;
        self.writer.write_all(b"\n")?;
        if self.line_width == 0 || sequence.is_empty() {
            self.writer.write_all(sequence)?;
            self.writer.write_all(b"\n")?;
        } else {
            for chunk in sequence.chunks(self.line_width) {
                self.writer.write_all(chunk)?;
                self.writer.write_all(b"\n")?;
            }
        }
        self.records_written += 1;
        Ok(())
    }

    /// Write one record
    pub fn write_record(&mut self, record: &FastaRecord) -> Result<()> {
        let title = if record.description.is_empty() {
            record.id.clone()
        } else {
            format!("{} {}", record.id, record.description)
        };
        self.write_sequence(&title, &record.sequence)
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl FastaWriter<CompressedWriter> {
    /// Create a writer for a sink (gzip chosen from the extension)
    pub fn new(sink: DataSink) -> Result<Self> {
        Ok(Self::from_writer(CompressedWriter::new(sink)?))
    }

    /// Flush all data and finalize compression
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn stream(data: &[u8]) -> FastaStream<BufReader<Cursor<&[u8]>>> {
        FastaStream::from_reader(BufReader::new(Cursor::new(data)))
    }

    #[test]
    fn test_parse_single_record() {
        let mut stream = stream(b">seq1\nGATTACA\n");

        let record = stream.next().unwrap().unwrap();
        assert_eq!(record.id, "seq1");
        assert_eq!(record.sequence, b"GATTACA");

        assert!(stream.next().is_none());
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let records: Vec<_> = stream(b">seq1\nGATT\nACA\n>seq2\nACGT\n")
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, b"GATTACA");
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].sequence, b"ACGT");
    }

    #[test]
    fn test_parse_with_description() {
        let record = stream(b">seq1 this is a description\nGATTACA\n")
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(record.id, "seq1");
        assert_eq!(record.description, "this is a description");
    }

    #[test]
    fn test_parse_with_empty_lines() {
        let records: Vec<_> = stream(b"\n>seq1\n\nGATTACA\n\n>seq2\nACGT\n\n")
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, b"GATTACA");
    }

    #[test]
    fn test_empty_sequence() {
        let records: Vec<_> = stream(b">seq1\n>seq2\nACGT\n")
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].sequence.is_empty());
    }

    #[test]
    fn test_invalid_no_header() {
        let mut stream = stream(b"GATTACA\n");
        assert!(matches!(
            stream.next().unwrap(),
            Err(FastqualError::InvalidFastaFormat { line: 1, .. })
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_non_utf8_header_is_format_error() {
        let mut stream = stream(b">seq1\nACGT\n>bad\xff\nAC\n");
        assert_eq!(stream.next().unwrap().unwrap().sequence, b"ACGT");
        assert!(matches!(
            stream.next().unwrap(),
            Err(FastqualError::InvalidFastaFormat { line: 3, .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(stream(b"").next().is_none());
    }

    #[test]
    fn test_writer_wraps() {
        let mut writer = FastaWriter::from_writer(Vec::new()).with_line_width(4);
        writer
            .write_record(&FastaRecord::new(
                "r1".to_string(),
                "d".to_string(),
                b"ACGTACGTAC".to_vec(),
            ))
            .unwrap();
        writer.write_sequence("r2", b"").unwrap();
        assert_eq!(writer.records_written(), 2);
        let out = writer.into_inner().unwrap();
        assert_eq!(out, b">r1 d\nACGT\nACGT\nAC\n>r2\n\n");
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        /// Written FASTA parses back to the same record at any width
        #[test]
        fn test_fasta_write_then_parse(
            id in "[A-Za-z0-9_]{1,50}",
            seq in "[ACGTN]{1,500}",
            width in 0..100usize,
        ) {
            let record = FastaRecord::new(id, String::new(), seq.into_bytes());
            let mut writer = FastaWriter::from_writer(Vec::new()).with_line_width(width);
            writer.write_record(&record).unwrap();
            let out = writer.into_inner().unwrap();

            let parsed: Vec<_> = stream(&out).collect::<Result<Vec<_>>>().unwrap();
            prop_assert_eq!(parsed, vec![record]);
        }
    }
}
