#[macro_use]
extern crate log;

use anyhow::{Context, Result};
use clap::Parser;
use fastqual::io::{CompressedReader, CompressedWriter};
use fastqual::{convert, FastqStream, FastqWriter, PairedFastaQualStream};

mod cli;

use cli::{Cli, Commands};

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert {
            input,
            from,
            to,
            output,
            line_width,
        } => {
            let reader = CompressedReader::new(cli::source(input)).with_context(|| format!("could not open {input}"))?;
            let mut writer = CompressedWriter::new(cli::sink(output))?;
            let count = convert::convert(reader, *from, &mut writer, *to, *line_width)
                .with_context(|| format!("converting {input} from {from} to {to}"))?;
            writer.finish()?;
            info!("Converted {count} records to {to}");
        }
        Commands::Pair {
            fasta,
            qual,
            encoding,
            output,
        } => {
            let paired = PairedFastaQualStream::new(cli::source(fasta), cli::source(qual))
                .with_context(|| format!("could not open {fasta} and {qual}"))?;
            let mut writer = FastqWriter::new(cli::sink(output), *encoding)?;
            for record in paired {
                writer.write_record(&record?)?;
            }
            let count = writer.records_written();
            writer.finish()?;
            info!("Wrote {count} {encoding} records");
        }
        Commands::Stats { input, encoding } => {
            let stream = FastqStream::new(cli::source(input), *encoding)
                .with_context(|| format!("could not open {input}"))?;

            let mut records = 0usize;
            let mut bases = 0usize;
            let mut quality_sum = 0u64;
            for record in stream {
                let record = record?;
                records += 1;
                bases += record.len();
                quality_sum += record.qualities.to_phred().iter().map(|&q| u64::from(q)).sum::<u64>();
            }

            println!("records\t{records}");
            println!("bases\t{bases}");
            if bases > 0 {
                println!("mean_quality\t{:.2}", quality_sum as f64 / bases as f64);
            } else {
                println!("mean_quality\tNA");
            }
            info!("Read {records} {encoding} records from {input}");
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));
        std::process::exit(1);
    }
}
