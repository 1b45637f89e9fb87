// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::osm::classify::{self, AreaKind};
use crate::osm::Error;
use crate::rings::assemble_rings;
use crate::{Bounds, Landuse, Model, Multipolygon, Node, Projection, Railway, Road, Way};

use super::element::{self, Element, ElementType};

/// Helper object used for storing state related to converting [OSM elements](Element)
/// into a [Model].
///
/// Node coordinates are kept as `(x: lon, y: lat)` until [ModelBuilder::finish]
/// projects them.
#[derive(Debug, Default)]
pub(super) struct ModelBuilder {
    bounds: Option<Bounds>,
    nodes: Vec<Node>,
    node_index: HashMap<i64, usize>,
    ways: Vec<Way>,
    way_index: HashMap<i64, usize>,
    roads: Vec<Road>,
    railways: Vec<Railway>,
    buildings: Vec<Multipolygon>,
    leisures: Vec<Multipolygon>,
    waters: Vec<Multipolygon>,
    landuses: Vec<Landuse>,
    unresolved_refs: usize,
}

impl ModelBuilder {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add all elements from the provided iterator.
    pub(super) fn add_elements<I>(&mut self, elements: I) -> Result<(), quick_xml::Error>
    where
        I: Iterator<Item = Result<Element, quick_xml::Error>>,
    {
        for e in elements {
            self.add_element(e?);
        }
        Ok(())
    }

    /// Projects all nodes and turns the collected entities into a [Model].
    pub(super) fn finish(mut self) -> Result<Model, Error> {
        let bounds = self.bounds.ok_or(Error::MissingBounds)?;
        let projection = Projection::from_bounds(&bounds).ok_or(Error::InvalidBounds(bounds))?;

        for node in self.nodes.iter_mut() {
            let p = projection.project(node.x, node.y);
            node.x = p.x;
            node.y = p.y;
        }

        if self.unresolved_refs > 0 {
            log::info!(
                "dropped {} references to unknown nodes",
                self.unresolved_refs
            );
        }

        log::info!(
            "loaded {} nodes, {} ways, {} roads, {} buildings, {} leisure areas, {} water areas, {} landuse areas",
            self.nodes.len(),
            self.ways.len(),
            self.roads.len(),
            self.buildings.len(),
            self.leisures.len(),
            self.waters.len(),
            self.landuses.len(),
        );

        Ok(Model {
            bounds,
            projection,
            nodes: self.nodes,
            ways: self.ways,
            roads: self.roads,
            railways: self.railways,
            buildings: self.buildings,
            leisures: self.leisures,
            waters: self.waters,
            landuses: self.landuses,
        })
    }

    fn add_element(&mut self, e: Element) {
        match e {
            Element::Bounds(b) => self.add_bounds(b),
            Element::Node(n) => self.add_node(n),
            Element::Way(w) => self.add_way(w),
            Element::Relation(r) => self.add_relation(r),
        }
    }

    fn add_bounds(&mut self, b: Bounds) {
        if self.bounds.is_some() {
            log::debug!("ignoring additional <bounds> element");
        } else {
            self.bounds = Some(b);
        }
    }

    fn add_node(&mut self, n: element::Node) {
        if self.node_index.contains_key(&n.id) {
            log::debug!("duplicate node {} - ignoring", n.id);
            return;
        }

        self.node_index.insert(n.id, self.nodes.len());
        self.nodes.push(Node {
            osm_id: n.id,
            x: n.lon,
            y: n.lat,
        });
    }

    fn add_way(&mut self, w: element::Way) {
        if self.way_index.contains_key(&w.id) {
            log::debug!("duplicate way {} - ignoring", w.id);
            return;
        }

        let nodes = self.resolve_way_nodes(&w);
        if nodes.is_empty() {
            log::debug!("way {} has no known nodes - ignoring", w.id);
            return;
        }

        let way_idx = self.ways.len();
        self.way_index.insert(w.id, way_idx);
        self.ways.push(Way { osm_id: w.id, nodes });

        self.classify_way(way_idx, &w);
    }

    /// Maps OSM node ids onto node indices, removing references to unknown nodes.
    fn resolve_way_nodes(&mut self, w: &element::Way) -> Vec<usize> {
        let mut nodes = Vec::with_capacity(w.nodes.len());
        for ref_ in &w.nodes {
            match self.node_index.get(ref_) {
                Some(&idx) => nodes.push(idx),
                None => {
                    log::debug!("way {} references unknown node {}", w.id, ref_);
                    self.unresolved_refs += 1;
                }
            }
        }
        nodes
    }

    fn classify_way(&mut self, way_idx: usize, w: &element::Way) {
        match classify::road(&w.tags) {
            Some((kind, name)) => self.roads.push(Road {
                way: way_idx,
                kind,
                name,
            }),
            None => {
                if let Some(highway) = w.tags.get("highway") {
                    log::debug!("way {}: unrecognized highway={}", w.id, highway);
                }
            }
        }

        if classify::is_railway(&w.tags) {
            self.railways.push(Railway { way: way_idx });
        }

        for kind in classify::area_kinds(&w.tags) {
            self.add_area(
                kind,
                Multipolygon {
                    outer: vec![way_idx],
                    inner: vec![],
                },
            );
        }
    }

    fn add_area(&mut self, kind: AreaKind, area: Multipolygon) {
        match kind {
            AreaKind::Building => self.buildings.push(area),
            AreaKind::Leisure => self.leisures.push(area),
            AreaKind::Water => self.waters.push(area),
            AreaKind::Landuse(kind) => self.landuses.push(Landuse { kind, area }),
        }
    }

    fn add_relation(&mut self, r: element::Relation) {
        let Some(kind) = classify::relation_area_kind(&r.tags) else {
            return;
        };

        let (outer, inner) = self.get_area_members(&r);
        let outer = self.resolve_rings(r.id, &outer);
        let inner = self.resolve_rings(r.id, &inner);

        if outer.is_empty() {
            log::warn!("relation {} has no closed outer rings - ignoring", r.id);
            return;
        }

        self.add_area(kind, Multipolygon { outer, inner });
    }

    /// Splits way members of an area relation into outer and inner way indices.
    fn get_area_members(&self, r: &element::Relation) -> (Vec<usize>, Vec<usize>) {
        let mut outer = Vec::default();
        let mut inner = Vec::default();

        for m in &r.members {
            if m.type_ != ElementType::Way {
                log::debug!("relation {}: ignoring {} member {}", r.id, m.type_, m.ref_);
                continue;
            }

            let Some(&way_idx) = self.way_index.get(&m.ref_) else {
                log::debug!("relation {} references unknown way {}", r.id, m.ref_);
                continue;
            };

            match m.role.as_str() {
                "outer" => outer.push(way_idx),
                "inner" => inner.push(way_idx),
                role => log::debug!(
                    "relation {}: way {} has unsupported role {:?}",
                    r.id,
                    m.ref_,
                    role
                ),
            }
        }

        (outer, inner)
    }

    fn resolve_rings(&mut self, relation_id: i64, members: &[usize]) -> Vec<usize> {
        let assembly = assemble_rings(&mut self.ways, members);
        if !assembly.leftover.is_empty() {
            log::warn!(
                "relation {}: {} way(s) could not be assembled into closed rings",
                relation_id,
                assembly.leftover.len()
            );
        }
        assembly.rings
    }
}
