// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{find_route, AStarError, KDTree, Model, Point, RoadGraph, Route, DEFAULT_STEP_LIMIT};

/// Additional controls for [RoutePlanner::find_route].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    /// Whether the query points are given relative to a square `[0, 1] × [0, 1]` area
    /// and need to be mapped onto the actual extent of the map,
    /// see [Model::query_point]. Defaults to `true`.
    pub correct_aspect_ratio: bool,

    /// Maximum number of node expansions, see [find_route].
    pub step_limit: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            correct_aspect_ratio: true,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Finds routes between arbitrary points of a [Model].
///
/// The planner indexes the roads of the model once; every call to
/// [RoutePlanner::find_route] uses fresh search state, so a single planner
/// can be shared between threads.
#[derive(Debug, Clone)]
pub struct RoutePlanner<'a> {
    graph: RoadGraph<'a>,
    index: Option<KDTree>,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(model: &'a Model) -> Self {
        let graph = RoadGraph::build(model);
        let index = KDTree::from_graph(&graph);
        Self { graph, index }
    }

    pub fn model(&self) -> &'a Model {
        self.graph.model()
    }

    pub fn graph(&self) -> &RoadGraph<'a> {
        &self.graph
    }

    /// Finds the road node closest to a point (in the coordinate system of the nodes).
    /// Returns `None` if the model has no roads.
    pub fn find_nearest_node(&self, p: Point) -> Option<usize> {
        self.index.as_ref().map(|tree| tree.find_nearest_node(p))
    }

    /// Finds the shortest route between the road nodes closest to `start` and `end`.
    ///
    /// Returns `Ok(None)` if either point has a non-finite coordinate, if the model has no roads,
    /// or if the two nodes are not connected.
    pub fn find_route(
        &self,
        start: Point,
        end: Point,
        options: &RouteOptions,
    ) -> Result<Option<Route>, AStarError> {
        if !is_finite(start) || !is_finite(end) {
            log::warn!("non-finite query point: {:?} -> {:?}", start, end);
            return Ok(None);
        }

        let model = self.model();
        let start = model.query_point(start, options.correct_aspect_ratio);
        let end = model.query_point(end, options.correct_aspect_ratio);

        let (Some(from), Some(to)) = (self.find_nearest_node(start), self.find_nearest_node(end))
        else {
            log::warn!("no roads to route over");
            return Ok(None);
        };

        log::debug!("routing from node {} to node {}", from, to);
        let route = find_route(&self.graph, from, to, options.step_limit)?;

        match route {
            Some(ref r) => log::info!(
                "found route with {} nodes, {:.0} m long",
                r.nodes.len(),
                r.length_meters(model.projection()),
            ),
            None => log::info!("no route between node {} and node {}", from, to),
        }

        Ok(route)
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::make_model;
    use crate::osm;
    use crate::RoadKind;

    const SIMPLE_XML: &[u8] = include_bytes!("osm/reader/test_fixtures/simple.osm");

    fn load_simple() -> Model {
        osm::load_from_buffer(&osm::Options::default(), SIMPLE_XML).unwrap()
    }

    const UNCORRECTED: RouteOptions = RouteOptions {
        correct_aspect_ratio: false,
        step_limit: DEFAULT_STEP_LIMIT,
    };

    #[test]
    fn route_over_document() {
        let m = load_simple();
        let p = RoutePlanner::new(&m);

        // Road nodes only: -6 is on a raceway, -10..-23 are areas
        assert_eq!(p.graph().iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

        let start = m.nodes()[0].position();
        let end = m.nodes()[4].position();
        let r = p.find_route(start, end, &UNCORRECTED).unwrap().unwrap();

        // Via -2 and -4: the residential street and the service road are shorter
        // than continuing on Main Street to -3
        assert_eq!(r.nodes, vec![0, 1, 3, 4]);

        // ~ 0.009° of longitude + 0.008° of latitude + 0.008° of longitude at 51°N
        let meters = r.length_meters(m.projection()) * 51.005_f64.to_radians().cos();
        assert!((meters - 2081.0).abs() < 5.0, "unexpected length: {meters}");
    }

    #[test]
    fn query_points_relative_to_square() {
        let m = load_simple();
        let p = RoutePlanner::new(&m);
        let aspect = m.projection().aspect_ratio();
        assert!(aspect > 1.0);

        let target = m.nodes()[4].position();
        let square = Point::new(target.x, target.y * aspect);

        let r = p
            .find_route(m.nodes()[0].position(), square, &RouteOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(r.nodes.last(), Some(&4));

        let corrected = m.query_point(square, true);
        assert!((corrected.x - target.x).abs() < 1e-9);
        assert!((corrected.y - target.y).abs() < 1e-9);
        assert_eq!(m.query_point(square, false), square);
    }

    #[test]
    fn start_and_end_snap_to_the_same_node() {
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
            &[(RoadKind::Residential, &[0, 1, 2])],
        );
        let p = RoutePlanner::new(&m);

        let r = p
            .find_route(Point::new(0.9, 0.1), Point::new(1.1, -0.1), &UNCORRECTED)
            .unwrap()
            .unwrap();
        assert_eq!(r.nodes, vec![1]);
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn nearest_node_ends_of_a_path() {
        // A(0,0) - B(1,0) - C(1,1)
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
            &[(RoadKind::Residential, &[0, 1]), (RoadKind::Service, &[1, 2])],
        );
        let p = RoutePlanner::new(&m);

        let r = p
            .find_route(Point::new(-0.1, 0.05), Point::new(1.05, 1.2), &UNCORRECTED)
            .unwrap()
            .unwrap();
        assert_eq!(r.nodes, vec![0, 1, 2]);
        assert!((r.cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_roads() {
        let m = make_model(&[(0.0, 0.0), (1.0, 1.0)], &[]);
        let p = RoutePlanner::new(&m);

        assert_eq!(p.find_nearest_node(Point::new(0.0, 0.0)), None);
        assert_eq!(
            p.find_route(Point::new(0.0, 0.0), Point::new(1.0, 1.0), &UNCORRECTED),
            Ok(None)
        );
    }

    #[test]
    fn disconnected_roads() {
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (5.0, 0.0), (6.0, 0.0)],
            &[
                (RoadKind::Residential, &[0, 1]),
                (RoadKind::Residential, &[2, 3]),
            ],
        );
        let p = RoutePlanner::new(&m);

        assert_eq!(
            p.find_route(Point::new(0.0, 0.0), Point::new(6.0, 0.0), &UNCORRECTED),
            Ok(None)
        );
    }

    #[test]
    fn non_finite_query_points() {
        let m = make_model(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
            &[(RoadKind::Residential, &[0, 1, 2])],
        );
        let p = RoutePlanner::new(&m);

        for bad in [
            Point::new(f64::NAN, 0.5),
            Point::new(0.5, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NAN),
        ] {
            assert_eq!(p.find_route(bad, Point::new(1.0, 1.0), &UNCORRECTED), Ok(None));
            assert_eq!(p.find_route(Point::new(0.0, 0.0), bad, &UNCORRECTED), Ok(None));
            assert_eq!(p.find_route(bad, bad, &RouteOptions::default()), Ok(None));
        }
    }
}
