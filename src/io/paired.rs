//! Paired FASTA + QUAL streaming
//!
//! # Overview
//!
//! Older sequencing pipelines (454, early capillary) ship residues and quality
//! scores as two files with the same records in the same order. This module
//! walks both in lock-step and merges each pair into one [`SeqRecord`].
//!
//! Every pair is checked: IDs must match, the score count must equal the
//! sequence length, and both files must end together.
//!
//! # Example
//!
//! ```no_run
//! use fastqual::PairedFastaQualStream;
//!
//! # fn main() -> fastqual::Result<()> {
//! let paired = PairedFastaQualStream::from_paths("reads.fna", "reads.qual")?;
//!
//! for record in paired {
//!     let record = record?;
//!     println!("{}: {} bp", record.id, record.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{FastqualError, Result};
use crate::io::{CompressedReader, DataSource, FastaStream, QualStream};
use crate::types::SeqRecord;
use log::{debug, warn};
use std::io::BufRead;
use std::path::Path;

/// Paired FASTA/QUAL stream iterator
///
/// Yields merged records carrying the FASTA sequence and description and the
/// QUAL Phred scores. After the first error the stream is exhausted.
pub struct PairedFastaQualStream<R1: BufRead, R2: BufRead> {
    fasta: FastaStream<R1>,
    qual: QualStream<R2>,
    record_count: usize,
    finished: bool,
}

impl PairedFastaQualStream<CompressedReader, CompressedReader> {
    /// Create a paired stream from two file paths
    pub fn from_paths<P1: AsRef<Path>, P2: AsRef<Path>>(fasta: P1, qual: P2) -> Result<Self> {
        Self::new(DataSource::from_path(fasta), DataSource::from_path(qual))
    }

    /// Create a paired stream from two data sources
    pub fn new(fasta: DataSource, qual: DataSource) -> Result<Self> {
        let fasta = FastaStream::new(fasta)?;
        let qual = QualStream::new(qual)?;
        Ok(Self::from_streams(fasta, qual))
    }
}

impl<R1: BufRead, R2: BufRead> PairedFastaQualStream<R1, R2> {
    /// Create a paired stream from two existing streams
    pub fn from_streams(fasta: FastaStream<R1>, qual: QualStream<R2>) -> Self {
        Self {
            fasta,
            qual,
            record_count: 0,
            finished: false,
        }
    }

    /// Get the number of merged records read so far
    pub fn records_read(&self) -> usize {
        self.record_count
    }

    fn next_pair(&mut self) -> Option<Result<SeqRecord>> {
        match (self.fasta.next(), self.qual.next()) {
            (Some(Ok(fasta)), Some(Ok(qual))) => {
                if fasta.id != qual.id {
                    return Some(Err(FastqualError::PairedIdMismatch {
                        fasta_id: fasta.id,
                        qual_id: qual.id,
                    }));
                }
                if fasta.sequence.len() != qual.qualities.len() {
                    return Some(Err(FastqualError::PairedLengthMismatch {
                        id: fasta.id,
                        sequence: fasta.sequence.len(),
                        quality: qual.qualities.len(),
                    }));
                }
                self.record_count += 1;
                Some(Ok(SeqRecord {
                    id: fasta.id,
                    description: fasta.description,
                    sequence: Some(fasta.sequence),
                    qualities: qual.qualities,
                }))
            }

            // Both files exhausted - normal completion
            (None, None) => None,

            (Some(Err(e)), _) | (_, Some(Err(e))) => Some(Err(e)),

            (Some(Ok(_)), None) => Some(Err(FastqualError::PairedRecordCountMismatch {
                longer: "FASTA",
                shorter: "QUAL",
                pairs: self.record_count,
            })),

            (None, Some(Ok(_))) => Some(Err(FastqualError::PairedRecordCountMismatch {
                longer: "QUAL",
                shorter: "FASTA",
                pairs: self.record_count,
            })),
        }
    }
}

impl<R1: BufRead, R2: BufRead> Iterator for PairedFastaQualStream<R1, R2> {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_pair();
        match &item {
            None => {
                debug!("paired FASTA/QUAL exhausted after {} records", self.record_count);
                self.finished = true;
            }
            Some(Err(e)) => {
                if self.record_count > 0 {
                    warn!("paired FASTA/QUAL stopped after {} records: {e}", self.record_count);
                }
                self.finished = true;
            }
            Some(Ok(_)) => {}
        }
        item
    }
}
