use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};
use fastqual::convert::OutputFormat;
use fastqual::io::{DataSink, DataSource};
use fastqual::QualityEncoding;

const ABOUT: &str = "
fastqual: convert and inspect FASTQ, FASTA and QUAL files
   ──────────────────────────────────
   Sanger, Solexa and Illumina 1.3+ quality encodings";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = fastqual::VERSION,
    about = ABOUT,
    arg_required_else_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a FASTQ file to another quality encoding, to FASTA or to QUAL
    #[command(arg_required_else_help = true)]
    Convert {
        /// the input .fastq file (`-` for stdin, gzip detected automatically)
        input: String,

        /// quality encoding of the input: sanger, solexa or illumina
        #[arg(long, default_value = "sanger")]
        from: QualityEncoding,

        /// output format: fastq-sanger, fastq-solexa, fastq-illumina, fasta or qual
        #[arg(long)]
        to: OutputFormat,

        /// the output file (stdout if omitted, gzip if it ends in .gz)
        #[arg(short)]
        output: Option<String>,

        /// line width for FASTA and QUAL output, 0 for no wrapping
        #[arg(long, default_value_t = fastqual::io::DEFAULT_LINE_WIDTH)]
        line_width: usize,
    },

    /// Merge a FASTA file and its QUAL file into FASTQ
    #[command(arg_required_else_help = true)]
    Pair {
        /// the .fasta file
        fasta: String,

        /// the matching .qual file
        qual: String,

        /// quality encoding of the output
        #[arg(long, default_value = "sanger")]
        encoding: QualityEncoding,

        /// the output .fastq (stdout if omitted)
        #[arg(short)]
        output: Option<String>,
    },

    /// Print record count, total bases and mean quality of a FASTQ file
    #[command(arg_required_else_help = true)]
    Stats {
        /// the input .fastq file (`-` for stdin)
        input: String,

        /// quality encoding of the input
        #[arg(long, default_value = "sanger")]
        encoding: QualityEncoding,
    },
}

/// Interpret `-` as standard input
pub fn source(path: &str) -> DataSource {
    match path {
        "-" => DataSource::stdin(),
        path => DataSource::from_path(path),
    }
}

/// Standard output unless a path was given
pub fn sink(output: &Option<String>) -> DataSink {
    match output {
        Some(path) => DataSink::from_path(path),
        None => DataSink::stdout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from(["fastqual", "convert", "in.fq", "--from", "solexa", "--to", "qual"]).unwrap();
        match cli.command {
            Commands::Convert { from, to, line_width, output, .. } => {
                assert_eq!(from, QualityEncoding::Solexa);
                assert_eq!(to, OutputFormat::Qual);
                assert_eq!(line_width, 60);
                assert!(output.is_none());
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_rejects_unknown_encoding() {
        let result = Cli::try_parse_from(["fastqual", "stats", "in.fq", "--encoding", "phred64"]);
        assert!(result.is_err());
    }
}
