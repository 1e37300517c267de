//! fastqual: streaming FASTQ, FASTA and QUAL I/O with quality score transcoding
//!
//! # Overview
//!
//! fastqual reads and writes the three text formats that carry per-base
//! quality scores. It handles the three FASTQ quality encodings and converts
//! between the Phred and Solexa scales. Parsers are streaming iterators over
//! any [`std::io::BufRead`], so memory stays proportional to one record.
//!
//! ## Quality encodings
//!
//! | Encoding | Scale | Offset | Scores |
//! |----------|-------|--------|--------|
//! | [`QualityEncoding::Sanger`] | Phred | 33 | 0..=93 |
//! | [`QualityEncoding::Solexa`] | Solexa | 64 | -5..=62 |
//! | [`QualityEncoding::Illumina`] | Phred | 64 | 0..=62 |
//!
//! ## Quick Start
//!
//! ```no_run
//! use fastqual::{FastqStream, FastqWriter, QualityEncoding};
//! use fastqual::io::DataSink;
//!
//! # fn main() -> fastqual::Result<()> {
//! // Re-encode an Illumina 1.3+ file as Sanger FASTQ (gzip by extension)
//! let input = FastqStream::from_path("reads.fq", QualityEncoding::Illumina)?;
//! let mut output = FastqWriter::new(DataSink::from_path("reads.sanger.fq.gz"), QualityEncoding::Sanger)?;
//!
//! for record in input {
//!     output.write_record(&record?)?;
//! }
//! output.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`quality`]: Phred/Solexa transcoders and [`QualityEncoding`]
//! - [`types`]: Record types shared by all parsers and writers
//! - [`io`]: Streaming parsers and writers (FASTQ, FASTA, QUAL, paired FASTA+QUAL)
//! - [`convert`]: Whole-file conversions that skip record construction
//! - [`error`]: [`FastqualError`] and the [`Result`] alias

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod convert;
pub mod error;
pub mod io;
pub mod quality;
pub mod types;

// Re-export commonly used types
pub use error::{FastqualError, Result};
pub use io::{
    FastaStream, FastaWriter, FastqRawStream, FastqStream, FastqWriter, PairedFastaQualStream, QualStream,
    QualWriter, QualWriterConfig,
};
pub use quality::{phred_from_solexa, solexa_from_phred, QualityEncoding};
pub use types::{FastaRecord, QualityScores, RawFastqRecord, SeqRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
