//! Quality-score transcoding and the FASTQ quality encodings
//!
//! # Scales
//!
//! - **Phred**: `Q = -10 log10(p)`, never negative.
//! - **Solexa**: `Q = -10 log10(p / (1 - p))`, negative for low-confidence calls.
//!
//! The two agree closely above ~Q15 and diverge sharply near zero.
//!
//! # Encodings
//!
//! | Encoding   | ASCII offset | Scale  | Score range |
//! |------------|--------------|--------|-------------|
//! | `Sanger`   | 33           | Phred  | 0..=93      |
//! | `Illumina` | 64           | Phred  | 0..=62      |
//! | `Solexa`   | 64           | Solexa | -5..=62     |
//!
//! One [`QualityEncoding`] value drives both decoding (ASCII → scores) and
//! encoding (scores → ASCII); the framing parser never needs to know which one
//! is in use.

use crate::error::{FastqualError, Result};
use crate::types::QualityScores;
use std::fmt;
use std::str::FromStr;

/// ASCII offset of Sanger (Phred+33) quality strings
pub const SANGER_OFFSET: u8 = 33;

/// ASCII offset of Solexa and Illumina 1.3+ quality strings
pub const SOLEXA_OFFSET: u8 = 64;

/// Highest printable ASCII character usable in a quality string (`~`)
const MAX_QUALITY_CHAR: u8 = b'~';

/// Lowest score Solexa files use
pub const SOLEXA_MIN: i8 = -5;

/// Convert a Phred quality to the Solexa scale
///
/// `10 log10(10^(phred/10) - 1)`. At `phred == 0` the formula's limit is
/// negative infinity, which is returned as such; negative input is treated as
/// zero. NaN propagates.
///
/// # Examples
///
/// ```
/// use fastqual::quality::solexa_from_phred;
///
/// assert!((solexa_from_phred(10.0) - 9.5424).abs() < 1e-4);
/// assert_eq!(solexa_from_phred(0.0), f64::NEG_INFINITY);
/// ```
pub fn solexa_from_phred(phred_quality: f64) -> f64 {
    if phred_quality.is_nan() {
        return phred_quality;
    }
    if phred_quality <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * (10f64.powf(phred_quality / 10.0) - 1.0).log10()
}

/// Convert a Solexa quality to the Phred scale
///
/// `10 log10(10^(solexa/10) + 1)`. Defined for every input; negative infinity
/// maps to exactly zero.
///
/// # Examples
///
/// ```
/// use fastqual::quality::phred_from_solexa;
///
/// assert!((phred_from_solexa(-5.0) - 1.1933).abs() < 1e-3);
/// assert_eq!(phred_from_solexa(f64::NEG_INFINITY), 0.0);
/// ```
pub fn phred_from_solexa(solexa_quality: f64) -> f64 {
    10.0 * (10f64.powf(solexa_quality / 10.0) + 1.0).log10()
}

/// Integer Phred → Solexa, rounded and floored at [`SOLEXA_MIN`]
///
/// Saturates at `i8::MAX` for Phred scores no FASTQ encoding can hold.
pub fn solexa_score_from_phred(phred: u8) -> i8 {
    let solexa = solexa_from_phred(f64::from(phred)).round();
    solexa.clamp(f64::from(SOLEXA_MIN), f64::from(i8::MAX)) as i8
}

/// Integer Solexa → Phred, rounded
pub fn phred_score_from_solexa(solexa: i8) -> u8 {
    phred_from_solexa(f64::from(solexa)).round() as u8
}

/// Numeric scale a quality encoding stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityScale {
    /// Phred scale
    Phred,
    /// Solexa scale
    Solexa,
}

/// FASTQ quality-string encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityEncoding {
    /// Sanger / Illumina 1.8+: Phred scores, offset 33
    #[default]
    Sanger,
    /// Early Solexa/Illumina (< 1.3): Solexa scores, offset 64
    Solexa,
    /// Illumina 1.3 – 1.7: Phred scores, offset 64
    Illumina,
}

impl QualityEncoding {
    /// All supported encodings
    pub const ALL: [QualityEncoding; 3] = [Self::Sanger, Self::Solexa, Self::Illumina];

    /// ASCII offset added to each score
    pub fn offset(self) -> u8 {
        match self {
            Self::Sanger => SANGER_OFFSET,
            Self::Solexa | Self::Illumina => SOLEXA_OFFSET,
        }
    }

    /// Scale of the stored scores
    pub fn scale(self) -> QualityScale {
        match self {
            Self::Sanger | Self::Illumina => QualityScale::Phred,
            Self::Solexa => QualityScale::Solexa,
        }
    }

    /// Lowest representable score
    pub fn min_score(self) -> i32 {
        match self {
            Self::Sanger | Self::Illumina => 0,
            Self::Solexa => i32::from(SOLEXA_MIN),
        }
    }

    /// Highest representable score
    pub fn max_score(self) -> i32 {
        i32::from(MAX_QUALITY_CHAR) - i32::from(self.offset())
    }

    /// Format name, as used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Sanger => "fastq-sanger",
            Self::Solexa => "fastq-solexa",
            Self::Illumina => "fastq-illumina",
        }
    }

    fn char_range(self) -> (u8, u8) {
        let low = i32::from(self.offset()) + self.min_score();
        (low as u8, MAX_QUALITY_CHAR)
    }

    fn invalid_char(self, c: u8, position: usize) -> FastqualError {
        let (low, high) = self.char_range();
        FastqualError::InvalidQuality {
            format: self.name(),
            msg: format!(
                "character {:?} (ASCII {}) at position {} is outside {:?}..={:?}",
                c as char, c, position, low as char, high as char
            ),
        }
    }

    /// Decode a quality string into scores on this encoding's scale
    ///
    /// # Examples
    ///
    /// ```
    /// use fastqual::{QualityEncoding, QualityScores};
    ///
    /// let scores = QualityEncoding::Sanger.decode(b"!!I~").unwrap();
    /// assert_eq!(scores, QualityScores::Phred(vec![0, 0, 40, 93]));
    ///
    /// let scores = QualityEncoding::Solexa.decode(b";@h").unwrap();
    /// assert_eq!(scores, QualityScores::Solexa(vec![-5, 0, 40]));
    /// ```
    pub fn decode(self, quality: &[u8]) -> Result<QualityScores> {
        let (low, high) = self.char_range();
        if let Some(pos) = quality.iter().position(|&c| c < low || c > high) {
            return Err(self.invalid_char(quality[pos], pos));
        }

        let offset = self.offset();
        Ok(match self.scale() {
            QualityScale::Phred => QualityScores::Phred(quality.iter().map(|&c| c - offset).collect()),
            QualityScale::Solexa => QualityScores::Solexa(
                quality
                    .iter()
                    .map(|&c| (i16::from(c) - i16::from(offset)) as i8)
                    .collect(),
            ),
        })
    }

    /// Encode one score given on this encoding's own scale
    fn encode_native(self, score: i32) -> Result<u8> {
        if score < self.min_score() || score > self.max_score() {
            return Err(FastqualError::EncodingRange {
                format: self.name(),
                score,
            });
        }
        Ok((score + i32::from(self.offset())) as u8)
    }

    /// Map a Phred score onto this encoding's scale
    fn char_for_phred(self, phred: u8) -> Result<u8> {
        match self.scale() {
            QualityScale::Phred => self.encode_native(i32::from(phred)),
            QualityScale::Solexa => {
                let solexa = solexa_from_phred(f64::from(phred)).round().max(f64::from(SOLEXA_MIN));
                if solexa > f64::from(self.max_score()) {
                    return Err(FastqualError::EncodingRange {
                        format: self.name(),
                        score: i32::from(phred),
                    });
                }
                self.encode_native(solexa as i32)
            }
        }
    }

    /// Map a Solexa score onto this encoding's scale
    ///
    /// Negative Solexa scores have no agreed Phred-scale rendering and are
    /// rejected for Phred encodings.
    fn char_for_solexa(self, solexa: i8) -> Result<u8> {
        match self.scale() {
            QualityScale::Solexa => self.encode_native(i32::from(solexa)),
            QualityScale::Phred => {
                if solexa < 0 {
                    return Err(FastqualError::EncodingRange {
                        format: self.name(),
                        score: i32::from(solexa),
                    });
                }
                let phred = phred_score_from_solexa(solexa);
                if i32::from(phred) > self.max_score() {
                    return Err(FastqualError::EncodingRange {
                        format: self.name(),
                        score: i32::from(solexa),
                    });
                }
                self.encode_native(i32::from(phred))
            }
        }
    }

    /// Encode scores into a quality string, appending to `out`
    ///
    /// On error `out` may hold a partial quality string.
    pub fn encode_into(self, scores: &QualityScores, out: &mut Vec<u8>) -> Result<()> {
        out.reserve(scores.len());
        match scores {
            QualityScores::Phred(q) => {
                for &p in q {
                    out.push(self.char_for_phred(p)?);
                }
            }
            QualityScores::Solexa(q) => {
                for &s in q {
                    out.push(self.char_for_solexa(s)?);
                }
            }
        }
        Ok(())
    }

    /// Encode scores into a new quality string
    ///
    /// # Examples
    ///
    /// ```
    /// use fastqual::{QualityEncoding, QualityScores};
    ///
    /// let scores = QualityScores::Phred(vec![0, 40, 93]);
    /// assert_eq!(QualityEncoding::Sanger.encode(&scores).unwrap(), b"!I~");
    /// assert!(QualityEncoding::Illumina.encode(&scores).is_err());
    /// ```
    pub fn encode(self, scores: &QualityScores) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(scores.len());
        self.encode_into(scores, &mut out)?;
        Ok(out)
    }

    /// Build a byte-level table translating quality strings from `self` to `to`
    ///
    /// Every character is resolved once, with the same rules as decoding a
    /// record and encoding it again.
    pub fn translation_table(self, to: QualityEncoding) -> TranslationTable {
        let mut table = [Translation::Invalid; 256];
        let (low, high) = self.char_range();
        for c in low..=high {
            let single = [c];
            let translated = self.decode(&single).and_then(|scores| to.encode(&scores));
            table[usize::from(c)] = match translated {
                Ok(out) => Translation::Char(out[0]),
                Err(FastqualError::EncodingRange { score, .. }) => Translation::OutOfRange(score),
                Err(_) => Translation::Invalid,
            };
        }
        TranslationTable {
            from: self,
            to,
            table,
        }
    }
}

impl fmt::Display for QualityEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sanger" | "phred" | "fastq" | "fastq-sanger" => Ok(Self::Sanger),
            "solexa" | "fastq-solexa" => Ok(Self::Solexa),
            "illumina" | "fastq-illumina" => Ok(Self::Illumina),
            other => Err(format!("unknown quality encoding: {other}")),
        }
    }
}

/// Outcome of translating one quality character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// Character in the target encoding
    Char(u8),
    /// Not a valid character in the source encoding
    Invalid,
    /// Valid in the source, but the score is not representable in the target
    OutOfRange(i32),
}

/// Precomputed character map between two quality encodings
#[derive(Debug, Clone)]
pub struct TranslationTable {
    from: QualityEncoding,
    to: QualityEncoding,
    table: [Translation; 256],
}

impl TranslationTable {
    /// Source encoding
    pub fn from_encoding(&self) -> QualityEncoding {
        self.from
    }

    /// Target encoding
    pub fn to_encoding(&self) -> QualityEncoding {
        self.to
    }

    /// Look up a single character
    pub fn get(&self, c: u8) -> Translation {
        self.table[usize::from(c)]
    }

    /// Translate a quality string in place
    pub fn translate(&self, quality: &mut [u8]) -> Result<()> {
        for (pos, c) in quality.iter_mut().enumerate() {
            match self.table[usize::from(*c)] {
                Translation::Char(out) => *c = out,
                Translation::Invalid => return Err(self.from.invalid_char(*c, pos)),
                Translation::OutOfRange(score) => {
                    return Err(FastqualError::EncodingRange {
                        format: self.to.name(),
                        score,
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert!((solexa_from_phred(10.0) - 9.542425094393248).abs() < 1e-9);
        assert!((solexa_from_phred(1.0) - (-5.868253243801154)).abs() < 1e-9);
        assert!((phred_from_solexa(0.0) - 3.010299956639812).abs() < 1e-9);
        assert!((phred_from_solexa(-5.0) - 1.1933104806609456).abs() < 1e-9);
    }

    #[test]
    fn test_zero_and_negative_phred() {
        assert_eq!(solexa_from_phred(0.0), f64::NEG_INFINITY);
        assert_eq!(solexa_from_phred(-3.0), f64::NEG_INFINITY);
        assert!(solexa_from_phred(f64::NAN).is_nan());
        assert_eq!(phred_from_solexa(solexa_from_phred(0.0)), 0.0);
    }

    #[test]
    fn test_integer_helpers() {
        assert_eq!(solexa_score_from_phred(0), -5);
        assert_eq!(solexa_score_from_phred(1), -5);
        assert_eq!(solexa_score_from_phred(2), -2);
        assert_eq!(solexa_score_from_phred(10), 10);
        assert_eq!(solexa_score_from_phred(255), i8::MAX);
        assert_eq!(phred_score_from_solexa(-5), 1);
        assert_eq!(phred_score_from_solexa(0), 3);
        assert_eq!(phred_score_from_solexa(62), 62);
    }

    #[test]
    fn test_encoding_ranges() {
        assert_eq!(QualityEncoding::Sanger.max_score(), 93);
        assert_eq!(QualityEncoding::Illumina.max_score(), 62);
        assert_eq!(QualityEncoding::Solexa.max_score(), 62);
        assert_eq!(QualityEncoding::Solexa.min_score(), -5);
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        assert!(matches!(
            QualityEncoding::Sanger.decode(b"II I"),
            Err(FastqualError::InvalidQuality { .. })
        ));
        // ';' is valid Solexa (-5) but not Illumina
        assert!(QualityEncoding::Solexa.decode(b";").is_ok());
        assert!(matches!(
            QualityEncoding::Illumina.decode(b";"),
            Err(FastqualError::InvalidQuality { .. })
        ));
        assert!(QualityEncoding::Solexa.decode(b":").is_err());
        assert!(QualityEncoding::Sanger.decode(&[127]).is_err());
    }

    #[test]
    fn test_sanger_boundary() {
        let ok = QualityScores::Phred(vec![93]);
        assert_eq!(QualityEncoding::Sanger.encode(&ok).unwrap(), b"~");

        let too_high = QualityScores::Phred(vec![94]);
        assert!(matches!(
            QualityEncoding::Sanger.encode(&too_high),
            Err(FastqualError::EncodingRange { score: 94, .. })
        ));
    }

    #[test]
    fn test_negative_solexa_to_phred_encoding() {
        let scores = QualityScores::Solexa(vec![10, -1]);
        for encoding in [QualityEncoding::Sanger, QualityEncoding::Illumina] {
            assert!(matches!(
                encoding.encode(&scores),
                Err(FastqualError::EncodingRange { score: -1, .. })
            ));
        }
        assert_eq!(QualityEncoding::Solexa.encode(&scores).unwrap(), b"J?");
    }

    #[test]
    fn test_phred_to_solexa_encoding_clamps_low_scores() {
        let scores = QualityScores::Phred(vec![0, 1, 40]);
        assert_eq!(QualityEncoding::Solexa.encode(&scores).unwrap(), b";;h");
    }

    #[test]
    fn test_translation_table_matches_record_path() {
        for from in QualityEncoding::ALL {
            for to in QualityEncoding::ALL {
                let table = from.translation_table(to);
                for c in 0u8..=255 {
                    let expected = from.decode(&[c]).and_then(|s| to.encode(&s));
                    match (table.get(c), expected) {
                        (Translation::Char(out), Ok(v)) => assert_eq!(vec![out], v),
                        (Translation::Invalid, Err(FastqualError::InvalidQuality { .. })) => {}
                        (Translation::OutOfRange(_), Err(FastqualError::EncodingRange { .. })) => {}
                        (got, want) => panic!("{from}->{to} {c}: {got:?} vs {want:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_translate_in_place() {
        let table = QualityEncoding::Sanger.translation_table(QualityEncoding::Illumina);
        let mut quality = b"!+5?I".to_vec();
        table.translate(&mut quality).unwrap();
        assert_eq!(quality, b"@JT^h");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("sanger".parse::<QualityEncoding>().unwrap(), QualityEncoding::Sanger);
        assert_eq!("fastq-solexa".parse::<QualityEncoding>().unwrap(), QualityEncoding::Solexa);
        assert_eq!("Illumina".parse::<QualityEncoding>().unwrap(), QualityEncoding::Illumina);
        assert!("bogus".parse::<QualityEncoding>().is_err());
    }

    use proptest::prelude::*;

    proptest! {
        /// phred_from_solexa undoes solexa_from_phred
        #[test]
        fn test_transcoder_inverse(phred in 0.0f64..100.0) {
            let back = phred_from_solexa(solexa_from_phred(phred));
            prop_assert!((back - phred).abs() < 1e-6, "{} -> {}", phred, back);
        }

        /// Any Sanger string decodes and re-encodes unchanged
        #[test]
        fn test_sanger_string_roundtrip(quality in "[!-~]{0,200}") {
            let scores = QualityEncoding::Sanger.decode(quality.as_bytes()).unwrap();
            let encoded = QualityEncoding::Sanger.encode(&scores).unwrap();
            prop_assert_eq!(encoded, quality.as_bytes());
        }

        /// Solexa strings round-trip through the Solexa encoding
        #[test]
        fn test_solexa_string_roundtrip(quality in "[;-~]{0,200}") {
            let scores = QualityEncoding::Solexa.decode(quality.as_bytes()).unwrap();
            let encoded = QualityEncoding::Solexa.encode(&scores).unwrap();
            prop_assert_eq!(encoded, quality.as_bytes());
        }
    }
}
