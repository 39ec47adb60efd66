// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Reading and writing of the JSON documents consumed by the graphs.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::DocumentError;

/// Format of a JSON document on disk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content when reading,
    /// or based on the file extension when writing
    #[default]
    Unknown,

    /// Force uncompressed JSON
    Json,

    /// Force JSON with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    JsonGz,

    /// Force JSON with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    JsonBz2,
}

impl FileFormat {
    /// Guesses the format from the extension of a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::JsonGz,
            Some("bz2") => Self::JsonBz2,
            Some("json") | Some("geojson") => Self::Json,
            _ => Self::Unknown,
        }
    }

    /// Guesses the format from the first bytes of a document.
    fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            Self::JsonGz
        } else if head.starts_with(b"BZh") {
            Self::JsonBz2
        } else {
            Self::Json
        }
    }
}

/// Parses a JSON document from a reader.
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn read_json_from_io<T: DeserializeOwned, R: io::Read>(
    reader: R,
    format: FileFormat,
) -> Result<T, DocumentError> {
    let mut b = io::BufReader::new(reader);
    let format = match format {
        FileFormat::Unknown => FileFormat::sniff(b.fill_buf()?),
        format => format,
    };

    match format {
        FileFormat::Unknown | FileFormat::Json => Ok(serde_json::from_reader(b)?),

        FileFormat::JsonGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            Ok(serde_json::from_reader(io::BufReader::new(d))?)
        }

        FileFormat::JsonBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            Ok(serde_json::from_reader(io::BufReader::new(d))?)
        }
    }
}

/// Parses a JSON document from a file at the provided path.
pub fn read_json_from_file<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
    format: FileFormat,
) -> Result<T, DocumentError> {
    let f = File::open(path)?;
    read_json_from_io(f, format)
}

/// Parses a JSON document from an in-memory buffer.
pub fn read_json_from_buffer<T: DeserializeOwned>(
    data: &[u8],
    format: FileFormat,
) -> Result<T, DocumentError> {
    if format == FileFormat::Json {
        // Fast path is available for uncompressed in-memory data
        Ok(serde_json::from_slice(data)?)
    } else {
        read_json_from_io(data, format)
    }
}

/// Writes a value as a pretty-printed JSON document.
/// [FileFormat::Unknown] is written as uncompressed JSON.
pub fn write_json_to_io<T: Serialize, W: io::Write>(
    writer: W,
    format: FileFormat,
    value: &T,
) -> Result<(), DocumentError> {
    match format {
        FileFormat::Unknown | FileFormat::Json => {
            let mut b = io::BufWriter::new(writer);
            serde_json::to_writer_pretty(&mut b, value)?;
            b.flush()?;
        }

        FileFormat::JsonGz => {
            let mut e = flate2::write::GzEncoder::new(writer, flate2::Compression::default());
            serde_json::to_writer_pretty(&mut e, value)?;
            e.finish()?;
        }

        FileFormat::JsonBz2 => {
            let mut e = bzip2::write::BzEncoder::new(writer, bzip2::Compression::default());
            serde_json::to_writer_pretty(&mut e, value)?;
            e.finish()?;
        }
    }

    Ok(())
}

/// Writes a value as a pretty-printed JSON document to a file at the provided path.
/// [FileFormat::Unknown] is resolved with [FileFormat::from_path].
pub fn write_json_to_file<T: Serialize, P: AsRef<Path>>(
    path: P,
    format: FileFormat,
    value: &T,
) -> Result<(), DocumentError> {
    let format = match format {
        FileFormat::Unknown => FileFormat::from_path(&path),
        format => format,
    };
    let f = File::create(path)?;
    write_json_to_io(f, format, value)
}
