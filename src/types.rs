//! Common types used throughout fastqual

use crate::error::{FastqualError, Result};
use crate::quality::{phred_score_from_solexa, solexa_score_from_phred};

/// Maps a header line (without the leading `@`/`>`) to `(id, description)`
///
/// Streams use [`split_title`] unless a parser is installed with
/// `with_title_parser`.
pub type TitleParser = Box<dyn Fn(&str) -> (String, String) + Send>;

/// Default title split: the first whitespace-delimited word is the ID,
/// the trimmed remainder is the description.
pub fn split_title(title: &str) -> (String, String) {
    let title = title.trim();
    match title.split_once(char::is_whitespace) {
        Some((id, rest)) => (id.to_string(), rest.trim_start().to_string()),
        None => (title.to_string(), String::new()),
    }
}

/// Per-base quality scores on their native scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityScores {
    /// Phred scores, `-10 log10(p)`
    Phred(Vec<u8>),
    /// Solexa scores, `-10 log10(p / (1 - p))`, may be negative
    Solexa(Vec<i8>),
}

impl QualityScores {
    /// Number of scores
    pub fn len(&self) -> usize {
        match self {
            Self::Phred(q) => q.len(),
            Self::Solexa(q) => q.len(),
        }
    }

    /// True if there are no scores
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scores converted to the Phred scale (rounded)
    pub fn to_phred(&self) -> Vec<u8> {
        match self {
            Self::Phred(q) => q.clone(),
            Self::Solexa(q) => q.iter().map(|&s| phred_score_from_solexa(s)).collect(),
        }
    }

    /// Scores converted to the Solexa scale (rounded, floored at -5)
    pub fn to_solexa(&self) -> Vec<i8> {
        match self {
            Self::Phred(q) => q.iter().map(|&p| solexa_score_from_phred(p)).collect(),
            Self::Solexa(q) => q.clone(),
        }
    }

    /// Mean score on the Phred scale, `None` when empty
    pub fn mean_phred(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let phred = self.to_phred();
        let total: u64 = phred.iter().map(|&q| u64::from(q)).sum();
        Some(total as f64 / phred.len() as f64)
    }
}

/// A sequence record with per-base quality scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    /// Sequence identifier (first word of the title)
    pub id: String,
    /// Rest of the title line, may be empty
    pub description: String,
    /// Residues; `None` for records read from QUAL files
    pub sequence: Option<Vec<u8>>,
    /// Quality scores, one per residue
    pub qualities: QualityScores,
}

impl SeqRecord {
    /// Create a record, checking that sequence and quality lengths agree
    ///
    /// # Examples
    ///
    /// ```
    /// use fastqual::{QualityScores, SeqRecord};
    ///
    /// let record = SeqRecord::new(
    ///     "r1".to_string(),
    ///     String::new(),
    ///     Some(b"ACGT".to_vec()),
    ///     QualityScores::Phred(vec![40, 40, 30, 20]),
    /// ).unwrap();
    /// assert_eq!(record.len(), 4);
    ///
    /// let bad = SeqRecord::new(
    ///     "r2".to_string(),
    ///     String::new(),
    ///     Some(b"ACGT".to_vec()),
    ///     QualityScores::Phred(vec![40]),
    /// );
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        id: String,
        description: String,
        sequence: Option<Vec<u8>>,
        qualities: QualityScores,
    ) -> Result<Self> {
        if let Some(seq) = &sequence {
            if seq.len() != qualities.len() {
                return Err(FastqualError::LengthMismatch {
                    id,
                    sequence: seq.len(),
                    quality: qualities.len(),
                });
            }
        }
        Ok(Self {
            id,
            description,
            sequence,
            qualities,
        })
    }

    /// Number of positions in the record
    pub fn len(&self) -> usize {
        self.qualities.len()
    }

    /// True if the record has no positions
    pub fn is_empty(&self) -> bool {
        self.qualities.is_empty()
    }

    /// Header text as written after `@` or `>`
    pub fn title(&self) -> String {
        if self.description.is_empty() {
            self.id.clone()
        } else {
            format!("{} {}", self.id, self.description)
        }
    }
}

/// One FASTQ entry as framed by the parser, before quality decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFastqRecord {
    /// Header line without the leading `@`
    pub title: String,
    /// Sequence bytes, wrapped lines joined
    pub sequence: Vec<u8>,
    /// Undecoded quality characters, wrapped lines joined
    pub quality: Vec<u8>,
}

/// A FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Sequence identifier (first word of the title)
    pub id: String,
    /// Rest of the title line, may be empty
    pub description: String,
    /// DNA/RNA/protein sequence
    pub sequence: Vec<u8>,
}

impl FastaRecord {
    /// Create a new FASTA record
    pub fn new(id: String, description: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_title() {
        assert_eq!(
            split_title("r1 sample=3 lane=1"),
            ("r1".to_string(), "sample=3 lane=1".to_string())
        );
        assert_eq!(split_title("r1"), ("r1".to_string(), String::new()));
        assert_eq!(split_title("r1\t x "), ("r1".to_string(), "x".to_string()));
        assert_eq!(split_title(""), (String::new(), String::new()));
    }

    #[test]
    fn test_record_length_invariant() {
        let err = SeqRecord::new(
            "r1".to_string(),
            String::new(),
            Some(b"ACG".to_vec()),
            QualityScores::Phred(vec![1, 2]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FastqualError::LengthMismatch { sequence: 3, quality: 2, .. }
        ));
    }

    #[test]
    fn test_record_without_sequence() {
        let record = SeqRecord::new(
            "q1".to_string(),
            "desc".to_string(),
            None,
            QualityScores::Phred(vec![10, 20, 30]),
        )
        .unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.title(), "q1 desc");
    }

    #[test]
    fn test_scale_conversion() {
        let phred = QualityScores::Phred(vec![0, 10, 40]);
        assert_eq!(phred.to_solexa(), vec![-5, 10, 40]);

        let solexa = QualityScores::Solexa(vec![-5, 0, 10, 40]);
        assert_eq!(solexa.to_phred(), vec![1, 3, 10, 40]);
    }

    #[test]
    fn test_mean_phred() {
        assert_eq!(QualityScores::Phred(vec![10, 20, 30]).mean_phred(), Some(20.0));
        assert_eq!(QualityScores::Phred(Vec::new()).mean_phred(), None);
    }
}
