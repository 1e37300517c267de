//! I/O module: streaming parsers, writers and compression
//!
//! Every parser is a pull-based iterator over a `BufRead` it owns; dropping
//! the iterator releases the source. `FastqWriter` encodes a whole record
//! before writing any of it; `QualWriter` checks a record's scores before
//! writing its header. `FastaWriter` writes as it goes.

pub mod compression;
pub mod fasta;
pub mod fastq;
mod paired;
pub mod qual;
pub mod sink;

pub use compression::{CompressedReader, CompressedWriter, DataSource};
pub use fasta::{FastaStream, FastaWriter, DEFAULT_LINE_WIDTH};
pub use fastq::{FastqRawStream, FastqStream, FastqWriter};
pub use paired::PairedFastaQualStream;
pub use qual::{QualStream, QualWriter, QualWriterConfig, RecordTitle};
pub use sink::DataSink;
