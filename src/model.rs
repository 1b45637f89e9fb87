// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Point, Projection};

/// Geographic bounding box of a loaded document, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// A point of the map, addressed by its index in [Model::nodes].
///
/// `x` and `y` are normalized planar coordinates, see [Projection].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub osm_id: i64,
    pub x: f64,
    pub y: f64,
}

impl Node {
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Ordered sequence of [Node] indices. A way whose first and last
/// nodes are the same describes a ring.
///
/// Ways synthesized by ring assembly have `osm_id == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub osm_id: i64,
    pub nodes: Vec<usize>,
}

impl Way {
    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 1 && self.nodes.first() == self.nodes.last()
    }
}

/// Class of a [Road], ordered from the most to the least important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoadKind {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Unclassified,
    Footway,
    Cycleway,
}

/// A [Way] which can be used for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Road {
    pub way: usize,
    pub kind: RoadKind,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Railway {
    pub way: usize,
}

/// Area described by outer boundaries and holes, both lists of [Way] indices.
///
/// Areas built from relations only reference closed ways.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipolygon {
    pub outer: Vec<usize>,
    pub inner: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanduseKind {
    Commercial,
    Construction,
    Grass,
    Forest,
    Industrial,
    Railway,
    Residential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landuse {
    pub kind: LanduseKind,
    pub area: Multipolygon,
}

/// Store of all entities parsed from a single map document.
///
/// Nodes are already projected onto the normalized plane; see [Model::projection].
/// Instances are created by the loaders in [crate::osm].
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) bounds: Bounds,
    pub(crate) projection: Projection,
    pub(crate) nodes: Vec<Node>,
    pub(crate) ways: Vec<Way>,
    pub(crate) roads: Vec<Road>,
    pub(crate) railways: Vec<Railway>,
    pub(crate) buildings: Vec<Multipolygon>,
    pub(crate) leisures: Vec<Multipolygon>,
    pub(crate) waters: Vec<Multipolygon>,
    pub(crate) landuses: Vec<Landuse>,
}

impl Model {
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn railways(&self) -> &[Railway] {
        &self.railways
    }

    pub fn buildings(&self) -> &[Multipolygon] {
        &self.buildings
    }

    pub fn leisures(&self) -> &[Multipolygon] {
        &self.leisures
    }

    pub fn waters(&self) -> &[Multipolygon] {
        &self.waters
    }

    pub fn landuses(&self) -> &[Landuse] {
        &self.landuses
    }

    /// Retrieves the [Node] at the provided index.
    pub fn get_node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Converts a query point into the coordinate system of the nodes.
    ///
    /// With `correct_aspect_ratio`, the point is assumed to be given relative to a square
    /// `[0, 1] × [0, 1]` area and is mapped onto the actual extent of the document
    /// (see [Projection::correct_query_point]). Points which don't originate from
    /// a rectangular extent should be passed through unchanged.
    pub fn query_point(&self, p: Point, correct_aspect_ratio: bool) -> Point {
        if correct_aspect_ratio {
            self.projection.correct_query_point(p)
        } else {
            p
        }
    }
}
