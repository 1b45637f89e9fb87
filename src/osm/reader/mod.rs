// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use model_builder::ModelBuilder;

use crate::osm::Error;
use crate::Model;

mod element;
mod model_builder;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format of a file based on its first few bytes.
    pub fn detect(magic: &[u8]) -> Self {
        if magic.starts_with(&[0x1f, 0x8b]) {
            Self::XmlGz
        } else if magic.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for loading a [Model].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,
}

/// Parse an OSM document from a reader into a [Model] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn load_from_io<R: io::Read>(options: &Options, reader: R) -> Result<Model, Error> {
    let mut b = io::BufReader::new(reader);

    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        format => format,
    };

    let mut builder = ModelBuilder::new();
    match format {
        FileFormat::Unknown | FileFormat::Xml => {
            builder.add_elements(xml::Reader::from_io(b))?;
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            builder.add_elements(xml::Reader::from_io(io::BufReader::new(d)))?;
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            builder.add_elements(xml::Reader::from_io(io::BufReader::new(d)))?;
        }
    }
    builder.finish()
}

/// Parse an OSM document from a file at the provided path into a [Model]
/// as per the provided [Options].
pub fn load_from_file<P: AsRef<Path>>(options: &Options, path: P) -> Result<Model, Error> {
    let f = File::open(path)?;
    load_from_io(options, f)
}

/// Parse an OSM document from a static buffer into a [Model] as per the provided [Options].
pub fn load_from_buffer(options: &Options, data: &[u8]) -> Result<Model, Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        format => format,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let mut builder = ModelBuilder::new();
        builder.add_elements(xml::Reader::from_buffer(data))?;
        builder.finish()
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let options = Options {
            file_format: format,
        };
        load_from_io(&options, io::Cursor::new(data))
    }
}
