//! QUAL streaming parser and writer
//!
//! QUAL files are FASTA-shaped, with decimal Phred scores in place of
//! residues:
//!
//! ```text
//! >read1 description
//! 40 40 39 38 20
//! 12 10
//! >read2
//! 30 30
//! ```
//!
//! Records parsed from QUAL carry no sequence (`SeqRecord::sequence` is
//! `None`); pair them with a FASTA file through
//! [`PairedFastaQualStream`](crate::io::PairedFastaQualStream) to get full
//! records.

use crate::error::{FastqualError, Result};
use crate::io::compression::{CompressedReader, CompressedWriter, DataSource};
use crate::io::fasta::DEFAULT_LINE_WIDTH;
use crate::io::DataSink;
use crate::types::{split_title, QualityScores, SeqRecord, TitleParser};
use log::debug;
use std::io::{BufRead, Write};
use std::path::Path;

/// Format name used in quality errors
const QUAL_FORMAT: &str = "qual";

/// QUAL streaming parser
///
/// # Example
///
/// ```no_run
/// use fastqual::QualStream;
///
/// let stream = QualStream::from_path("reads.qual")?;
/// for record in stream {
///     let record = record?;
///     println!("{}: {:?}", record.id, record.qualities.mean_phred());
/// }
/// # Ok::<(), fastqual::FastqualError>(())
/// ```
pub struct QualStream<R: BufRead> {
    reader: R,
    line_buffer: Vec<u8>,
    line_number: usize,
    finished: bool,
    next_header: Option<(Vec<u8>, usize)>,
    title_parser: Option<TitleParser>,
}

impl QualStream<CompressedReader> {
    /// Create a QUAL stream from a data source (gzip detected)
    pub fn new(source: DataSource) -> Result<Self> {
        debug!("reading {source:?} as QUAL");
        Ok(Self::from_reader(CompressedReader::new(source)?))
    }

    /// Create a QUAL stream from a local file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSource::from_path(path))
    }
}

impl<R: BufRead> QualStream<R> {
    /// Create a QUAL stream from any buffered reader
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

    fn read_record(&mut self) -> Result<Option<SeqRecord>> {
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
            return Err(FastqualError::InvalidQualFormat {
                line: header_line,
                msg: format!(
                    "Expected '>' at start of header, got: {}",
                    String::from_utf8_lossy(&header)
                ),
            });
        };
        let Ok(title) = std::str::from_utf8(title) else {
            return Err(FastqualError::InvalidQualFormat {
                line: header_line,
                msg: "Header is not valid UTF-8".to_string(),
            });
        };

        let mut scores = Vec::new();
        while self.next_line()? {
            let line = self.line_buffer.trim_ascii();
            if line.starts_with(b">") {
                self.next_header = Some((line.to_vec(), self.line_number));
                break;
            }
            for token in line.split(u8::is_ascii_whitespace).filter(|t| !t.is_empty()) {
                scores.push(parse_score(token, self.line_number)?);
            }
        }

        let (id, description) = match &self.title_parser {
            Some(parser) => parser(title),
            None => split_title(title),
        };
        Ok(Some(SeqRecord {
            id,
            description,
            sequence: None,
            qualities: QualityScores::Phred(scores),
        }))
    }
}

fn parse_score(token: &[u8], line: usize) -> Result<u8> {
    let token = String::from_utf8_lossy(token);
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FastqualError::InvalidQuality {
            format: QUAL_FORMAT,
            msg: format!("{:?} at line {} is not a non-negative integer", token, line),
        });
    }
    token.parse::<u8>().map_err(|_| FastqualError::InvalidQuality {
        format: QUAL_FORMAT,
        msg: format!("{} at line {} is larger than {}", token, line, u8::MAX),
    })
}

impl<R: BufRead> Iterator for QualStream<R> {
    type Item = Result<SeqRecord>;

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

/// Produces the header text (without `>`) for a record
pub type RecordTitle = Box<dyn Fn(&SeqRecord) -> String + Send>;

/// Output options for [`QualWriter`]
pub struct QualWriterConfig {
    /// Maximum characters per score line; `None` or `Some(0)` disables wrapping
    pub line_width: Option<usize>,
    /// Header generator; defaults to [`SeqRecord::title`]
    pub title: Option<RecordTitle>,
}

impl Default for QualWriterConfig {
    fn default() -> Self {
        Self {
            line_width: Some(DEFAULT_LINE_WIDTH),
            title: None,
        }
    }
}

impl QualWriterConfig {
    /// Set the line width
    pub fn line_width(mut self, line_width: Option<usize>) -> Self {
        self.line_width = line_width;
        self
    }

    /// Set the header generator
    pub fn title<F>(mut self, title: F) -> Self
    where
        F: Fn(&SeqRecord) -> String + Send + 'static,
    {
        self.title = Some(Box::new(title));
        self
    }
}

/// QUAL writer
///
/// Solexa-scale records are written as their rounded Phred equivalents;
/// negative Solexa scores have no Phred rendering and are rejected.
///
/// # Example
///
/// ```
/// use fastqual::{QualWriter, QualWriterConfig, QualityScores, SeqRecord};
///
/// let record = SeqRecord::new(
///     "r1".to_string(),
///     String::new(),
///     None,
///     QualityScores::Phred(vec![40, 40, 30, 20, 10]),
/// ).unwrap();
///
/// let config = QualWriterConfig::default()
///     .line_width(Some(6))
///     .title(|r| format!("{} len={}", r.id, r.len()));
/// let mut writer = QualWriter::with_config(Vec::new(), config);
/// writer.write_record(&record).unwrap();
///
/// let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(out, ">r1 len=5\n40 40\n30 20\n10\n");
/// ```
pub struct QualWriter<W: Write> {
    writer: W,
    config: QualWriterConfig,
    line: String,
    records_written: usize,
}

impl<W: Write> QualWriter<W> {
    /// Wrap any writer with the default configuration
    pub fn from_writer(writer: W) -> Self {
        Self::with_config(writer, QualWriterConfig::default())
    }

    /// Wrap any writer with an explicit configuration
    pub fn with_config(writer: W, config: QualWriterConfig) -> Self {
        Self {
            writer,
            config,
            line: String::with_capacity(128),
            records_written: 0,
        }
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Write one record
    ///
    /// QUAL holds Phred scores only. Solexa scores are converted, and a
    /// negative Solexa score fails with [`FastqualError::EncodingRange`]
    /// before anything is written.
    pub fn write_record(&mut self, record: &SeqRecord) -> Result<()> {
        if let QualityScores::Solexa(scores) = &record.qualities {
            if let Some(&score) = scores.iter().find(|&&s| s < 0) {
                return Err(FastqualError::EncodingRange {
                    format: QUAL_FORMAT,
                    score: i32::from(score),
                });
            }
        }

        let title = match &self.config.title {
            Some(title) => title(record),
            None => record.title(),
        };
        writeln!(self.writer, ">{}", title)?;

        let width = self.config.line_width.unwrap_or(0);
        self.line.clear();
        for score in record.qualities.to_phred() {
            let token = score.to_string();
            if width > 0 && !self.line.is_empty() && self.line.len() + 1 + token.len() > width {
                writeln!(self.writer, "{}", self.line)?;
                self.line.clear();
            }
            if !self.line.is_empty() {
                self.line.push(' ');
            }
            self.line.push_str(&token);
        }
        if !self.line.is_empty() {
            writeln!(self.writer, "{}", self.line)?;
        }

        self.records_written += 1;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl QualWriter<CompressedWriter> {
    /// Create a writer for a sink (gzip chosen from the extension)
    pub fn new(sink: DataSink, config: QualWriterConfig) -> Result<Self> {
        Ok(Self::with_config(CompressedWriter::new(sink)?, config))
    }

    /// Flush all data and finalize compression
    pub fn finish(self) -> Result<()> {
        debug!("QUAL writer finished after {} records", self.records_written);
        self.writer.finish()?;
        Ok(())
    }
}
