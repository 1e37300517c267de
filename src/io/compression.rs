//! Sources and writers with transparent gzip support
//!
//! Reading: [`DataSource`] names where bytes come from, [`CompressedReader`]
//! sniffs the gzip magic bytes and decompresses when needed. Multi-member
//! gzip (including bgzip) is handled by `flate2::read::MultiGzDecoder`.
//!
//! Writing: [`CompressedWriter`] picks gzip or plain output from the
//! [`DataSink`] extension.

use crate::error::Result;
use crate::io::DataSink;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where input data comes from
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Local file path
    Local(PathBuf),
    /// Standard input
    Stdin,
}

impl DataSource {
    /// Create a local file data source
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        DataSource::Local(path.as_ref().to_path_buf())
    }

    /// Create a source reading standard input
    pub fn stdin() -> Self {
        DataSource::Stdin
    }

    /// Open the data source and return a buffered reader
    pub fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            DataSource::Local(path) => {
                let file = File::open(path)?;
                debug!("opened {}", path.display());
                Ok(Box::new(BufReader::new(file)))
            }
            DataSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
        }
    }
}

/// Buffered reader that decompresses gzip input on the fly
///
/// # Example
///
/// ```no_run
/// use fastqual::io::{CompressedReader, DataSource};
///
/// # fn main() -> fastqual::Result<()> {
/// let reader = CompressedReader::new(DataSource::from_path("reads.fq.gz"))?;
/// // Reader implements BufRead, use with any of the stream parsers
/// # Ok(())
/// # }
/// ```
pub struct CompressedReader {
    inner: Box<dyn BufRead + Send>,
}

impl CompressedReader {
    /// Open a data source, detecting gzip compression from its first bytes
    pub fn new(source: DataSource) -> Result<Self> {
        Self::from_reader(source.open()?)
    }

    /// Wrap an already open reader, detecting gzip compression
    pub fn from_reader(mut reader: Box<dyn BufRead + Send>) -> Result<Self> {
        let is_gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

        if is_gzipped {
            debug!("gzip input detected");
            Ok(Self {
                inner: Box::new(BufReader::new(MultiGzDecoder::new(reader))),
            })
        } else {
            Ok(Self { inner: reader })
        }
    }

    /// Get the inner buffered reader
    pub fn into_inner(self) -> Box<dyn BufRead + Send> {
        self.inner
    }
}

impl Read for CompressedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CompressedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Output writer with optional gzip compression
///
/// Call [`finish`](CompressedWriter::finish) to surface errors from the final
/// flush and, for gzip, to write the stream trailer. Dropping the writer only
/// flushes on a best-effort basis.
///
/// # Example
///
/// ```no_run
/// use fastqual::io::{CompressedWriter, DataSink};
/// use std::io::Write;
///
/// # fn main() -> std::io::Result<()> {
/// let mut writer = CompressedWriter::new(DataSink::from_path("out.fq.gz"))?;
/// writer.write_all(b"@r1\nACGT\n+\nIIII\n")?;
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
pub enum CompressedWriter {
    /// Uncompressed writer with buffering
    Plain(Option<BufWriter<Box<dyn Write>>>),

    /// Gzip compressed writer, default compression level
    Gzip(Option<GzEncoder<BufWriter<Box<dyn Write>>>>),
}

impl CompressedWriter {
    /// Create a writer for a sink, compressing when the extension asks for it
    pub fn new(sink: DataSink) -> io::Result<Self> {
        let compressed = sink.is_compressed();
        let writer: Box<dyn Write> = match &sink {
            DataSink::Local(path) => Box::new(File::create(path)?),
            DataSink::Stdout => Box::new(io::stdout()),
        };
        debug!("writing to {sink:?} (gzip: {compressed})");

        if compressed {
            Self::new_gzip(writer)
        } else {
            Self::new_plain(writer)
        }
    }

    /// Create a plain (uncompressed) writer
    pub fn new_plain(writer: Box<dyn Write>) -> io::Result<Self> {
        Ok(Self::Plain(Some(BufWriter::new(writer))))
    }

    /// Create a gzip compressed writer
    pub fn new_gzip(writer: Box<dyn Write>) -> io::Result<Self> {
        let encoder = GzEncoder::new(BufWriter::new(writer), Compression::default());
        Ok(Self::Gzip(Some(encoder)))
    }

    /// Flush buffered data without finalizing the stream
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(Some(w)) => w.flush(),
            Self::Gzip(Some(w)) => w.flush(),
            _ => Ok(()),
        }
    }

    /// Flush everything and finalize compression
    pub fn finish(mut self) -> io::Result<()> {
        match &mut self {
            Self::Plain(w) => match w.take() {
                Some(mut writer) => writer.flush(),
                None => Ok(()),
            },
            Self::Gzip(w) => match w.take() {
                Some(encoder) => {
                    let mut inner = encoder.finish()?;
                    inner.flush()
                }
                None => Ok(()),
            },
        }
    }
}

impl Write for CompressedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(Some(w)) => w.write(buf),
            Self::Gzip(Some(w)) => w.write(buf),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                "Cannot write to finished writer",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        CompressedWriter::flush(self)
    }
}

impl Drop for CompressedWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
