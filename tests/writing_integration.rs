//! Integration tests for writing operations
//!
//! These tests run complete read → transform → write pipelines through real
//! files, including gzip output and re-reading what was written.

use fastqual::io::{DataSink, DataSource};
use fastqual::{
    FastaWriter, FastqStream, FastqWriter, FastqualError, PairedFastaQualStream, QualStream, QualWriter,
    QualWriterConfig, QualityEncoding, QualityScores,
};
use std::io::Write;
use tempfile::TempDir;

fn write_file(path: &std::path::Path, contents: &str) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

/// Illumina → Sanger through gzip, then back
#[test]
fn test_pipeline_reencode_gzip() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.fq");
    let output_path = temp_dir.path().join("output.fq.gz");

    write_file(&input_path, "@read1 lane 1\nACGT\n+\nhhT@\n@read2\nNN\n+\n@@\n");

    {
        let input = FastqStream::from_path(&input_path, QualityEncoding::Illumina).unwrap();
        let mut writer = FastqWriter::new(DataSink::from_path(&output_path), QualityEncoding::Sanger).unwrap();
        for record in input {
            writer.write_record(&record.unwrap()).unwrap();
        }
        assert_eq!(writer.records_written(), 2);
        writer.finish().unwrap();
    }

    // Output is gzip on disk
    let bytes = std::fs::read(&output_path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let records: Vec<_> = FastqStream::from_path(&output_path, QualityEncoding::Sanger)
        .unwrap()
        .collect::<fastqual::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "read1");
    assert_eq!(records[0].description, "lane 1");
    assert_eq!(records[0].qualities, QualityScores::Phred(vec![40, 40, 20, 0]));
    assert_eq!(records[1].qualities, QualityScores::Phred(vec![0, 0]));
}

/// Sanger scores above 62 cannot go to Illumina; earlier records survive
#[test]
fn test_pipeline_out_of_range_stops() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.fq");
    let output_path = temp_dir.path().join("output.fq");

    write_file(&input_path, "@ok\nAC\n+\nII\n@high\nAC\n+\n~I\n@never\nA\n+\nI\n");

    let input = FastqStream::sanger(std::io::BufReader::new(std::fs::File::open(&input_path).unwrap()));
    let mut writer = FastqWriter::new(DataSink::from_path(&output_path), QualityEncoding::Illumina).unwrap();

    let mut error = None;
    for record in input {
        if let Err(e) = writer.write_record(&record.unwrap()) {
            error = Some(e);
            break;
        }
    }
    writer.finish().unwrap();

    assert!(matches!(
        error,
        Some(FastqualError::EncodingRange {
            format: "fastq-illumina",
            score: 93
        })
    ));
    assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "@ok\nAC\n+\nhh\n");
}

/// FASTQ → FASTA + QUAL → paired stream gives back the original records
#[test]
fn test_pipeline_split_and_pair() {
    let temp_dir = TempDir::new().unwrap();
    let fastq_path = temp_dir.path().join("reads.fq");
    let fasta_path = temp_dir.path().join("reads.fasta");
    let qual_path = temp_dir.path().join("reads.qual.gz");

    let mut fastq = String::new();
    for i in 0..25 {
        fastq.push_str(&format!("@read_{i} sample=A\n{}\n+\n{}\n", "ACGTN".repeat(30), "I5+'!".repeat(30)));
    }
    write_file(&fastq_path, &fastq);

    {
        let mut fasta = FastaWriter::new(DataSink::from_path(&fasta_path)).unwrap();
        let mut qual = QualWriter::new(DataSink::from_path(&qual_path), QualWriterConfig::default()).unwrap();
        for record in FastqStream::from_path(&fastq_path, QualityEncoding::Sanger).unwrap() {
            let record = record.unwrap();
            fasta.write_sequence(&record.title(), record.sequence.as_deref().unwrap()).unwrap();
            qual.write_record(&record).unwrap();
        }
        fasta.finish().unwrap();
        qual.finish().unwrap();
    }

    // QUAL lines are wrapped at 60 characters
    let quals = QualStream::from_path(&qual_path).unwrap();
    assert_eq!(quals.count(), 25);

    let original: Vec<_> = FastqStream::from_path(&fastq_path, QualityEncoding::Sanger)
        .unwrap()
        .collect::<fastqual::Result<Vec<_>>>()
        .unwrap();
    let paired: Vec<_> = PairedFastaQualStream::new(DataSource::from_path(&fasta_path), DataSource::from_path(&qual_path))
        .unwrap()
        .collect::<fastqual::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(paired, original);
}

/// Paired files of different lengths fail after the common prefix
#[test]
fn test_pair_count_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let fasta_path = temp_dir.path().join("a.fasta");
    let qual_path = temp_dir.path().join("a.qual");

    write_file(&fasta_path, ">r1\nAC\n>r2\nGT\n");
    write_file(&qual_path, ">r1\n30 30\n");

    let results: Vec<_> = PairedFastaQualStream::from_paths(&fasta_path, &qual_path).unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_pairing());
}

/// Solexa records written to QUAL use rounded Phred values; negative
/// Solexa scores have no Phred rendering and stop the write
#[test]
fn test_solexa_to_qual() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("solexa.fq");
    let output_path = temp_dir.path().join("solexa.qual");

    write_file(&input_path, "@s1\nACG\n+\n@Jh\n@s2\nAC\n+\n;h\n");

    let mut error = None;
    {
        let config = QualWriterConfig::default().title(|r| format!("{} converted", r.id));
        let mut writer = QualWriter::new(DataSink::from_path(&output_path), config).unwrap();
        for record in FastqStream::from_path(&input_path, QualityEncoding::Solexa).unwrap() {
            if let Err(e) = writer.write_record(&record.unwrap()) {
                error = Some(e);
                break;
            }
        }
        assert_eq!(writer.records_written(), 1);
        writer.finish().unwrap();
    }

    assert!(matches!(
        error,
        Some(FastqualError::EncodingRange { format: "qual", score: -5 })
    ));
    assert_eq!(
        std::fs::read_to_string(&output_path).unwrap(),
        ">s1 converted\n3 10 40\n"
    );
}
