// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::{euclidean_distance, Model, Point};

/// Routable view of a [Model]: maps node indices onto indices of
/// all [Roads](crate::Road) passing through that node.
///
/// Nodes not present in the map are not part of the graph. Edges are implicit:
/// a node is connected to its predecessor and successor in every road way it belongs to.
///
/// The graph only holds indices into the [Model], which must not change
/// while the graph is alive.
#[derive(Debug, Clone)]
pub struct RoadGraph<'a> {
    model: &'a Model,
    node_roads: BTreeMap<usize, Vec<usize>>,
}

impl<'a> RoadGraph<'a> {
    /// Indexes all roads of a [Model].
    ///
    /// Roads are visited in the order of their [RoadKind](crate::RoadKind)
    /// (most important first, ties in store order), and that's also the order
    /// of road indices in every bucket.
    pub fn build(model: &'a Model) -> Self {
        let mut roads: Vec<usize> = (0..model.roads().len()).collect();
        roads.sort_by_key(|&r| model.roads()[r].kind);

        let mut node_roads: BTreeMap<usize, Vec<usize>> = BTreeMap::default();
        for road_idx in roads {
            let road = &model.roads()[road_idx];
            let Some(way) = model.ways().get(road.way) else {
                log::warn!("road {} references unknown way {}", road_idx, road.way);
                continue;
            };

            for &node_idx in &way.nodes {
                let bucket = node_roads.entry(node_idx).or_default();
                if bucket.last() != Some(&road_idx) {
                    bucket.push(road_idx);
                }
            }
        }

        log::info!("road graph has {} nodes", node_roads.len());
        Self { model, node_roads }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.node_roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_roads.is_empty()
    }

    pub fn contains(&self, node_idx: usize) -> bool {
        self.node_roads.contains_key(&node_idx)
    }

    /// Returns an iterator over indices of all nodes in the graph, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.node_roads.keys().copied()
    }

    /// Gets indices of all roads passing through a node.
    pub fn roads_through(&self, node_idx: usize) -> &[usize] {
        self.node_roads
            .get(&node_idx)
            .map(|r| r.as_slice())
            .unwrap_or_default()
    }

    /// Returns all nodes directly connected to the provided node, without duplicates,
    /// in the order of discovery.
    pub fn neighbors(&self, node_idx: usize) -> Vec<usize> {
        let mut neighbors = Vec::default();
        let mut add = |n: usize| {
            if n != node_idx && !neighbors.contains(&n) {
                neighbors.push(n);
            }
        };

        for &road_idx in self.roads_through(node_idx) {
            let way = &self.model.ways()[self.model.roads()[road_idx].way];

            // A node may appear more than once in a way, e.g. the first node of a closed way
            for (pos, _) in way.nodes.iter().enumerate().filter(|&(_, &n)| n == node_idx) {
                if pos > 0 {
                    add(way.nodes[pos - 1]);
                }
                if let Some(&next) = way.nodes.get(pos + 1) {
                    add(next);
                }
            }
        }

        neighbors
    }

    /// Returns the position of a node in the graph.
    pub fn position(&self, node_idx: usize) -> Option<Point> {
        if self.contains(node_idx) {
            self.model.get_node(node_idx).map(|n| n.position())
        } else {
            None
        }
    }

    /// Finds the graph node closest to the given point.
    /// Ties are resolved in favor of the lowest node index.
    ///
    /// This function requires computing the distance to every node in the graph;
    /// build a [KDTree](crate::KDTree) to answer many queries.
    pub fn find_nearest_node(&self, p: Point) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;

        for node_idx in self.iter() {
            let dist = euclidean_distance(p, self.model.nodes()[node_idx].position());
            match best {
                Some((best_dist, _)) if best_dist <= dist => {}
                _ => best = Some((dist, node_idx)),
            }
        }

        best.map(|(_, idx)| idx)
    }
}
