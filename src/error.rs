//! Error types for fastqual

use thiserror::Error;

/// Result type alias for fastqual operations
pub type Result<T> = std::result::Result<T, FastqualError>;

/// Error types that can occur in fastqual
#[derive(Debug, Error)]
pub enum FastqualError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid FASTQ framing
    #[error("Invalid FASTQ format at line {line}: {msg}")]
    InvalidFastqFormat {
        /// Line number where error occurred
        line: usize,
        /// Error message
        msg: String,
    },

    /// Invalid FASTA framing
    #[error("Invalid FASTA format at line {line}: {msg}")]
    InvalidFastaFormat {
        /// Line number where error occurred
        line: usize,
        /// Error message
        msg: String,
    },

    /// Invalid QUAL framing
    #[error("Invalid QUAL format at line {line}: {msg}")]
    InvalidQualFormat {
        /// Line number where error occurred
        line: usize,
        /// Error message
        msg: String,
    },

    /// Quality character or integer outside the valid range of its encoding
    #[error("Invalid {format} quality: {msg}")]
    InvalidQuality {
        /// Format the value was read from (`fastq-sanger`, `qual`, ...)
        format: &'static str,
        /// Error message
        msg: String,
    },

    /// Score cannot be represented by the target encoding
    #[error("Quality score {score} cannot be encoded as {format}")]
    EncodingRange {
        /// Target format (`fastq-illumina`, `qual`, ...)
        format: &'static str,
        /// Offending score (on the record's own scale)
        score: i32,
    },

    /// Sequence and quality lengths disagree on a constructed record
    #[error("Record {id}: sequence length ({sequence}) != quality length ({quality})")]
    LengthMismatch {
        /// Record identifier
        id: String,
        /// Sequence length
        sequence: usize,
        /// Number of quality scores
        quality: usize,
    },

    /// Record has no sequence but the output format needs one
    #[error("Record {id} has no sequence")]
    MissingSequence {
        /// Record identifier
        id: String,
    },

    /// Paired FASTA/QUAL identifier mismatch
    #[error("Paired FASTA/QUAL ID mismatch: FASTA={fasta_id}, QUAL={qual_id}")]
    PairedIdMismatch {
        /// FASTA record ID
        fasta_id: String,
        /// QUAL record ID
        qual_id: String,
    },

    /// One of the paired files ran out before the other
    #[error("{longer} file has more records than {shorter} (continues after {pairs} pairs)")]
    PairedRecordCountMismatch {
        /// Name of the file that still has records
        longer: &'static str,
        /// Name of the exhausted file
        shorter: &'static str,
        /// Number of pairs read successfully
        pairs: usize,
    },

    /// Paired FASTA/QUAL record length mismatch
    #[error("Paired record {id}: sequence length ({sequence}) != quality count ({quality})")]
    PairedLengthMismatch {
        /// Record identifier
        id: String,
        /// FASTA sequence length
        sequence: usize,
        /// Number of QUAL scores
        quality: usize,
    },
}

impl FastqualError {
    /// True for the paired-iterator error family
    pub fn is_pairing(&self) -> bool {
        matches!(
            self,
            Self::PairedIdMismatch { .. }
                | Self::PairedRecordCountMismatch { .. }
                | Self::PairedLengthMismatch { .. }
        )
    }

    /// True for malformed record framing in any of the text formats
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Self::InvalidFastqFormat { .. }
                | Self::InvalidFastaFormat { .. }
                | Self::InvalidQualFormat { .. }
        )
    }
}
