// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{euclidean_distance, AStarError, Projection, RoadGraph};

/// Sequence of node indices from the start to the end (inclusive),
/// together with its total length in normalized units.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<usize>,
    pub cost: f64,
}

impl Route {
    /// Converts the length of the route into (Mercator) meters.
    pub fn length_meters(&self, projection: &Projection) -> f64 {
        self.cost * projection.metric_scale()
    }
}

/// Per-search state of a node.
#[derive(Debug, Clone, Copy)]
struct Scratch {
    /// Cost from the start
    g: f64,
    /// Estimated total cost (g + straight-line distance to the end)
    f: f64,
    parent: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: usize,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score.eq(&other.score)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.total_cmp(&self.score)
    }
}

fn reconstruct_path(scratch: &HashMap<usize, Scratch>, last: usize) -> Vec<usize> {
    let mut path = vec![last];
    let mut visited = HashSet::from([last]);
    let mut at = last;

    while let Some(parent) = scratch.get(&at).and_then(|s| s.parent) {
        if !visited.insert(parent) {
            log::warn!("cycle detected at node {} while reconstructing route", parent);
            break;
        }
        path.push(parent);
        at = parent;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes of a [RoadGraph].
///
/// Edge costs and the heuristic are straight-line distances between node positions.
/// All search state is local to the call - the graph and its model are never modified.
///
/// Returns `Ok(None)` if there is no route between the two nodes, and a single-node route
/// if `from_idx == to_idx`.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [AStarError::StepLimitExceeded]. Every node is expanded at most once,
/// so a limit equal to the number of nodes in the graph is never exceeded.
/// The recommended value is [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route(
    g: &RoadGraph<'_>,
    from_idx: usize,
    to_idx: usize,
    step_limit: usize,
) -> Result<Option<Route>, AStarError> {
    let from = g
        .position(from_idx)
        .ok_or(AStarError::InvalidReference(from_idx))?;
    let to = g
        .position(to_idx)
        .ok_or(AStarError::InvalidReference(to_idx))?;

    if from_idx == to_idx {
        return Ok(Some(Route {
            nodes: vec![from_idx],
            cost: 0.0,
        }));
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut scratch: HashMap<usize, Scratch> = HashMap::default();
    let mut closed: HashSet<usize> = HashSet::default();
    let mut steps: usize = 0;

    {
        let h = euclidean_distance(from, to);
        scratch.insert(
            from_idx,
            Scratch {
                g: 0.0,
                f: h,
                parent: None,
            },
        );
        queue.push(QueueItem {
            at: from_idx,
            score: h,
        });
    }

    while let Some(item) = queue.pop() {
        if closed.contains(&item.at) {
            continue;
        }

        let Some(&current) = scratch.get(&item.at) else {
            continue;
        };

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.score > current.f {
            continue;
        }

        if item.at == to_idx {
            let nodes = reconstruct_path(&scratch, to_idx);
            log::debug!(
                "route found after {} steps: {} nodes, cost {}",
                steps,
                nodes.len(),
                current.g
            );
            return Ok(Some(Route {
                nodes,
                cost: current.g,
            }));
        }

        steps += 1;
        if steps > step_limit {
            return Err(AStarError::StepLimitExceeded);
        }

        closed.insert(item.at);
        let Some(at) = g.position(item.at) else {
            continue;
        };

        for neighbor_idx in g.neighbors(item.at) {
            // Straight-line distance is a consistent heuristic -
            // a node can't be reached more cheaply after it was expanded.
            if closed.contains(&neighbor_idx) {
                continue;
            }

            let Some(neighbor) = g.position(neighbor_idx) else {
                continue;
            };

            let cost = current.g + euclidean_distance(at, neighbor);
            let score = cost + euclidean_distance(neighbor, to);

            // Check if this is the cheapest way to the neighbor
            if let Some(known) = scratch.get(&neighbor_idx) {
                if known.f <= score {
                    continue;
                }
            }

            // Push the new item into the queue
            scratch.insert(
                neighbor_idx,
                Scratch {
                    g: cost,
                    f: score,
                    parent: Some(item.at),
                },
            );
            queue.push(QueueItem {
                at: neighbor_idx,
                score,
            });
        }
    }

    log::debug!("no route after {} steps", steps);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::make_model;
    use crate::{Model, RoadKind, DEFAULT_STEP_LIMIT};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn route(g: &RoadGraph<'_>, from: usize, to: usize) -> Option<Route> {
        find_route(g, from, to, DEFAULT_STEP_LIMIT).unwrap()
    }

    /// Nine nodes and six roads, with several alternative routes between most pairs.
    fn mesh_model() -> Model {
        make_model(
            &[
                (0.0, 0.0),
                (1.0, 0.0),
                (2.0, 0.0),
                (3.0, 0.0),
                (1.0, 1.0),
                (2.0, 1.5),
                (0.5, -1.0),
                (2.5, -1.0),
                (1.5, 0.5),
            ],
            &[
                (RoadKind::Primary, &[0, 1, 2, 3]),
                (RoadKind::Residential, &[0, 4, 5, 3]),
                (RoadKind::Residential, &[0, 6, 7, 3]),
                (RoadKind::Service, &[1, 8, 5]),
                (RoadKind::Service, &[4, 8, 2]),
                (RoadKind::Footway, &[6, 2]),
            ],
        )
    }

    /// Finds the length of the shortest path by enumerating all simple paths.
    fn exhaustive_shortest(g: &RoadGraph<'_>, from: usize, to: usize) -> Option<f64> {
        fn dfs(
            g: &RoadGraph<'_>,
            at: usize,
            to: usize,
            cost: f64,
            visited: &mut Vec<usize>,
            best: &mut Option<f64>,
        ) {
            if at == to {
                if best.map_or(true, |b| cost < b) {
                    *best = Some(cost);
                }
                return;
            }

            for n in g.neighbors(at) {
                if visited.contains(&n) {
                    continue;
                }
                let d = euclidean_distance(g.position(at).unwrap(), g.position(n).unwrap());
                visited.push(n);
                dfs(g, n, to, cost + d, visited, best);
                visited.pop();
            }
        }

        let mut best = None;
        dfs(g, from, to, 0.0, &mut vec![from], &mut best);
        best
    }

    fn path_length(g: &RoadGraph<'_>, nodes: &[usize]) -> f64 {
        nodes
            .windows(2)
            .map(|pair| {
                assert!(g.neighbors(pair[0]).contains(&pair[1]));
                euclidean_distance(g.position(pair[0]).unwrap(), g.position(pair[1]).unwrap())
            })
            .sum()
    }

    #[test]
    fn simple_path() {
        // A(0,0) - B(1,0) - C(1,1)
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
            &[(RoadKind::Residential, &[0, 1]), (RoadKind::Residential, &[1, 2])],
        );
        let g = RoadGraph::build(&m);

        let r = route(&g, 0, 2).unwrap();
        assert_eq!(r.nodes, vec![0, 1, 2]);
        assert_almost_eq!(r.cost, 2.0);

        let r = route(&g, 2, 0).unwrap();
        assert_eq!(r.nodes, vec![2, 1, 0]);
        assert_almost_eq!(r.cost, 2.0);
    }

    #[test]
    fn same_start_and_end() {
        let m = mesh_model();
        let g = RoadGraph::build(&m);

        let r = route(&g, 5, 5).unwrap();
        assert_eq!(r.nodes, vec![5]);
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn optimal_on_small_graph() {
        let m = mesh_model();
        let g = RoadGraph::build(&m);

        for from in 0..m.nodes().len() {
            for to in 0..m.nodes().len() {
                let expected = exhaustive_shortest(&g, from, to).unwrap();
                let r = route(&g, from, to).unwrap();

                assert_eq!(r.nodes.first(), Some(&from));
                assert_eq!(r.nodes.last(), Some(&to));
                assert_almost_eq!(r.cost, expected);
                assert_almost_eq!(path_length(&g, &r.nodes), r.cost);
            }
        }
    }

    #[test]
    fn goal_reached_through_longer_first_edge() {
        // Generating the goal first from 1 (via the long 1-3 edge) must not end the search,
        // as 0-2-3 is shorter overall.
        //
        //   1
        //   │ \
        //   0──2──3
        let m = make_model(
            &[(0.0, 0.0), (0.0, 0.2), (1.0, 0.0), (2.0, 0.0)],
            &[
                (RoadKind::Residential, &[0, 1, 3]),
                (RoadKind::Residential, &[0, 2, 3]),
            ],
        );
        let g = RoadGraph::build(&m);

        let r = route(&g, 0, 3).unwrap();
        assert_eq!(r.nodes, vec![0, 2, 3]);
        assert_almost_eq!(r.cost, 2.0);
    }

    #[test]
    fn around_a_closed_way() {
        //  3───2
        //  │   │
        //  0───1──4
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (1.2, 1.0), (0.0, 1.0), (2.0, 0.0)],
            &[
                (RoadKind::Residential, &[0, 1, 2, 3, 0]),
                (RoadKind::Service, &[1, 4]),
            ],
        );
        let g = RoadGraph::build(&m);

        let r = route(&g, 3, 4).unwrap();
        assert_eq!(r.nodes, vec![3, 0, 1, 4]);
        assert_almost_eq!(r.cost, 3.0);

        // The first node of a closed way is connected to the second-to-last one
        let r = route(&g, 0, 3).unwrap();
        assert_eq!(r.nodes, vec![0, 3]);
        assert_almost_eq!(r.cost, 1.0);
    }

    #[test]
    fn disconnected_components() {
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)],
            &[
                (RoadKind::Residential, &[0, 1, 2]),
                (RoadKind::Residential, &[3, 4]),
            ],
        );
        let g = RoadGraph::build(&m);

        assert_eq!(route(&g, 0, 4), None);
        assert_eq!(route(&g, 4, 1), None);

        // Exhausting the start's component never takes more steps than there are nodes
        assert_eq!(find_route(&g, 0, 4, g.len()), Ok(None));
    }

    #[test]
    fn terminates_within_node_count() {
        let m = mesh_model();
        let g = RoadGraph::build(&m);

        for from in 0..m.nodes().len() {
            for to in 0..m.nodes().len() {
                assert!(find_route(&g, from, to, g.len()).is_ok());
            }
        }
    }

    #[test]
    fn step_limit() {
        let m = mesh_model();
        let g = RoadGraph::build(&m);
        assert_eq!(find_route(&g, 6, 5, 1), Err(AStarError::StepLimitExceeded));
    }

    #[test]
    fn invalid_reference() {
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (5.0, 5.0)],
            &[(RoadKind::Residential, &[0, 1])],
        );
        let g = RoadGraph::build(&m);

        assert_eq!(find_route(&g, 0, 2, 10), Err(AStarError::InvalidReference(2)));
        assert_eq!(find_route(&g, 42, 0, 10), Err(AStarError::InvalidReference(42)));
    }

    #[test]
    fn length_in_meters() {
        let m = make_model(
            &[(0.0, 0.0), (0.5, 0.0)],
            &[(RoadKind::Residential, &[0, 1])],
        );
        let g = RoadGraph::build(&m);

        let r = route(&g, 0, 1).unwrap();
        assert_almost_eq!(
            r.length_meters(m.projection()),
            0.5 * m.projection().metric_scale()
        );
    }
}
