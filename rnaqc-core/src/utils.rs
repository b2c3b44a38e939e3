use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::errors::FeatureError;

fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Get a reader for a file path, or stdin when the path is `-`.
///
pub fn get_dynamic_reader_w_stdin(file_path_str: &str) -> Result<BufReader<Box<dyn Read>>> {
    if file_path_str == "-" {
        Ok(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>))
    } else {
        get_dynamic_reader(Path::new(file_path_str))
    }
}

///
/// A file sink, gzip compressed or plain.
///
/// Dropping a `DynWriter` without calling [`DynWriter::finish`] loses any error
/// raised while writing the gzip trailer.
///
pub enum DynWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl DynWriter {
    /// Write the gzip trailer (if any) and flush everything down to the file.
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            DynWriter::Plain(mut writer) => writer.flush(),
            DynWriter::Gz(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for DynWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            DynWriter::Plain(writer) => writer.write(buf),
            DynWriter::Gz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            DynWriter::Plain(writer) => writer.flush(),
            DynWriter::Gz(encoder) => encoder.flush(),
        }
    }
}

///
/// A sink that must be finalized explicitly before it is released.
///
pub trait FinishWrite: Write {
    fn finish_write(self) -> std::io::Result<()>;
}

impl FinishWrite for DynWriter {
    fn finish_write(self) -> std::io::Result<()> {
        self.finish()
    }
}

impl FinishWrite for Vec<u8> {
    fn finish_write(self) -> std::io::Result<()> {
        Ok(())
    }
}

///
/// Get a buffered writer, gzip compressed when the path ends in `.gz`.
/// Parent directories are created as needed.
///
pub fn get_dynamic_writer(path: &Path) -> Result<DynWriter> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let writer = match is_gzipped(path) {
        true => DynWriter::Gz(GzEncoder::new(BufWriter::new(file), Compression::default())),
        false => DynWriter::Plain(BufWriter::new(file)),
    };

    Ok(writer)
}

///
/// Parse column `idx` of a split line into a number.
///
pub fn parse_column<T: FromStr>(fields: &[&str], idx: usize) -> Result<T, FeatureError> {
    let raw = fields.get(idx).ok_or(FeatureError::MissingColumns {
        expected: idx + 1,
        found: fields.len(),
    })?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| FeatureError::InvalidCoordinate {
            column: idx,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case("plain.tsv")]
    #[case("nested/dir/compressed.tsv.gz")]
    fn test_writer_reader_pair(#[case] name: &str) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);

        let mut writer = get_dynamic_writer(&path).unwrap();
        writeln!(writer, "T1\tE1\t10\t40").unwrap();
        writeln!(writer, "T1\tE1\t60\t5").unwrap();
        writer.finish().unwrap();

        let lines: Vec<String> = get_dynamic_reader(&path)
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["T1\tE1\t10\t40", "T1\tE1\t60\t5"]);
    }

    #[rstest]
    fn test_gz_writer_finish_writes_trailer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pending.tsv.gz");

        let mut writer = get_dynamic_writer(&path).unwrap();
        writeln!(writer, "T1\tE1\t10\t40").unwrap();
        writer.flush().unwrap();
        // flush alone leaves the gzip member without its trailer
        let mut raw = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut raw).unwrap();
        let flushed = raw.len();

        writer.finish().unwrap();
        let mut raw = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut raw).unwrap();
        assert!(raw.len() >= flushed + 8);
        // ISIZE: uncompressed length in the last four bytes of the trailer
        assert_eq!(&raw[raw.len() - 4..], &12u32.to_le_bytes()[..]);
    }

    #[rstest]
    fn test_parse_column() {
        let fields = vec!["G1", "100", "abc"];
        assert_eq!(parse_column::<u32>(&fields, 1).unwrap(), 100);
        assert!(matches!(
            parse_column::<u32>(&fields, 2),
            Err(FeatureError::InvalidCoordinate { column: 2, .. })
        ));
        assert!(matches!(
            parse_column::<u32>(&fields, 5),
            Err(FeatureError::MissingColumns { expected: 6, found: 3 })
        ));
    }
}
