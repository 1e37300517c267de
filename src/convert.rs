//! Format conversion fast paths
//!
//! FASTQ → FASTQ re-encoding works on the raw quality strings through a
//! precomputed [`TranslationTable`](crate::quality::TranslationTable) and
//! keeps titles byte-for-byte. FASTQ → FASTA skips quality decoding
//! entirely. FASTQ → QUAL goes through [`SeqRecord`](crate::SeqRecord)s since
//! every score has to be printed anyway.
//!
//! # Example
//!
//! ```
//! use fastqual::convert::fastq_to_fastq;
//! use fastqual::QualityEncoding;
//! use std::io::Cursor;
//!
//! let input = Cursor::new(b"@r1\nACG\n+\n!5I\n".to_vec());
//! let mut output = Vec::new();
//! let n = fastq_to_fastq(input, QualityEncoding::Sanger, &mut output, QualityEncoding::Illumina)?;
//! assert_eq!(n, 1);
//! assert_eq!(output, b"@r1\nACG\n+\n@Th\n");
//! # Ok::<(), fastqual::FastqualError>(())
//! ```

use crate::error::Result;
use crate::io::{FastaWriter, FastqRawStream, FastqStream, QualWriter, QualWriterConfig};
use crate::quality::QualityEncoding;
use log::debug;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Target of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// FASTQ with the given quality encoding
    Fastq(QualityEncoding),
    /// FASTA, qualities dropped
    Fasta,
    /// QUAL, sequence dropped
    Qual,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fastq(encoding) => write!(f, "{encoding}"),
            Self::Fasta => f.write_str("fasta"),
            Self::Qual => f.write_str("qual"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fasta" | "fa" => Ok(Self::Fasta),
            "qual" => Ok(Self::Qual),
            other => other.parse().map(Self::Fastq),
        }
    }
}

/// Re-encode FASTQ quality strings from one encoding to another
///
/// Returns the number of records written. Fails on the first record holding a
/// character that is invalid in `from` or not representable in `to`.
pub fn fastq_to_fastq<R, W>(reader: R, from: QualityEncoding, mut writer: W, to: QualityEncoding) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let table = from.translation_table(to);
    let mut count = 0;
    for raw in FastqRawStream::from_reader(reader) {
        let raw = raw?;
        let mut quality = raw.quality;
        table.translate(&mut quality)?;

        writer.write_all(b"@")?;
        writer.write_all(raw.title.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.write_all(&raw.sequence)?;
        writer.write_all(b"\n+\n")?;
        writer.write_all(&quality)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    debug!("converted {count} records from {from} to {to}");
    Ok(count)
}

/// Write the sequences of a FASTQ file as FASTA
///
/// Quality strings are framed but not decoded.
pub fn fastq_to_fasta<R, W>(reader: R, writer: W, line_width: usize) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut fasta = FastaWriter::from_writer(writer).with_line_width(line_width);
    for raw in FastqRawStream::from_reader(reader) {
        let raw = raw?;
        fasta.write_sequence(&raw.title, &raw.sequence)?;
    }
    let count = fasta.records_written();
    fasta.into_inner()?;
    debug!("converted {count} records to FASTA");
    Ok(count)
}

/// Write the qualities of a FASTQ file as QUAL (Phred scale)
pub fn fastq_to_qual<R, W>(reader: R, from: QualityEncoding, writer: W, line_width: usize) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let config = QualWriterConfig::default().line_width(Some(line_width));
    let mut qual = QualWriter::with_config(writer, config);
    for record in FastqStream::from_reader(reader, from) {
        qual.write_record(&record?)?;
    }
    let count = qual.records_written();
    qual.into_inner()?;
    debug!("converted {count} records from {from} to QUAL");
    Ok(count)
}

/// Convert FASTQ to any [`OutputFormat`]
pub fn convert<R, W>(reader: R, from: QualityEncoding, writer: W, to: OutputFormat, line_width: usize) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    match to {
        OutputFormat::Fastq(encoding) => fastq_to_fastq(reader, from, writer, encoding),
        OutputFormat::Fasta => fastq_to_fasta(reader, writer, line_width),
        OutputFormat::Qual => fastq_to_qual(reader, from, writer, line_width),
    }
}
