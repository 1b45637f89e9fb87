// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{euclidean_distance, Point, RoadGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    node_idx: usize,
    position: Point,
}

impl Entry {
    /// Returns `true` if `self` is a better candidate than `other` for a point:
    /// it's closer, or equally close with a lower node index.
    #[inline]
    fn beats(&self, dist: f64, other: &Entry, other_dist: f64) -> bool {
        dist < other_dist || (dist == other_dist && self.node_idx < other.node_idx)
    }
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree)
/// over the nodes of a [RoadGraph], answering nearest-node queries in logarithmic time.
///
/// Answers are the same as [RoadGraph::find_nearest_node], including the tie-break
/// in favor of the lowest node index.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Entry,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the index of the node closest to the given point.
    pub fn find_nearest_node(&self, p: Point) -> usize {
        self.find_nearest_node_impl(p, false).0.node_idx
    }

    fn find_nearest_node_impl(&self, p: Point, y_divides: bool) -> (Entry, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = euclidean_distance(p, best.position);

        // Select which branch to recurse into first
        let first_left = if y_divides {
            p.y < best.position.y
        } else {
            p.x < best.position.x
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(p, !y_divides);
            if alt.beats(alt_dist, &best, best_dist) {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer (or equally close) node is possible in the second branch if and only if
            // the splitting axis is not further than the current best candidate.
            let dist_to_axis = if y_divides {
                (p.y - self.pivot.position.y).abs()
            } else {
                (p.x - self.pivot.position.x).abs()
            };

            if dist_to_axis <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(p, !y_divides);
                if alt.beats(alt_dist, &best, best_dist) {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from all nodes of a [RoadGraph].
    /// Returns `None` if the graph is empty.
    pub fn from_graph(g: &RoadGraph<'_>) -> Option<Self> {
        let mut entries = g
            .iter()
            .filter_map(|node_idx| {
                g.position(node_idx)
                    .map(|position| Entry { node_idx, position })
            })
            .collect::<Vec<_>>();
        Self::build_impl(entries.as_mut_slice(), false)
    }

    fn build_impl(entries: &mut [Entry], y_divides: bool) -> Option<Self> {
        match entries.len() {
            0 => None,
            1 => Some(Self {
                pivot: entries[0],
                left: None,
                right: None,
            }),
            _ => {
                if y_divides {
                    entries.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
                } else {
                    entries.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
                }
                let median = entries.len() / 2;
                let pivot = entries[median];
                let (left, right_and_pivot) = entries.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !y_divides).map(Box::new),
                    right: Self::build_impl(right, !y_divides).map(Box::new),
                })
            }
        }
    }
}
