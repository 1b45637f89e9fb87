// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of [OpenStreetMap XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
//! documents into a [Model](crate::Model).

use std::io;

use crate::Bounds;

mod classify;
mod reader;

pub use classify::{area_kinds, landuse_kind, relation_area_kind, road_kind, AreaKind};
pub use reader::{load_from_buffer, load_from_file, load_from_io, FileFormat, Options};

/// Error which can occur when loading a [Model](crate::Model).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document has no <bounds> element")]
    MissingBounds,

    #[error("invalid bounds: {0:?}")]
    InvalidBounds(Bounds),
}
