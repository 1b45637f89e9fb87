// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Map model construction and route planning over [OpenStreetMap](https://www.openstreetmap.org/) extracts.
//!
//! An OSM XML document is loaded into a [Model]: projected nodes, ways, roads, railways
//! and areas (buildings, leisure, water and landuse), with multipolygon relations
//! assembled into closed rings. Roads of a model are indexed by a [RoadGraph],
//! over which A* finds shortest paths between the nodes closest to two query points.
//!
//! # Example
//!
//! ```no_run
//! let model = wayplan::osm::load_from_file(
//!     &wayplan::osm::Options::default(),
//!     "path/to/map.osm",
//! ).expect("failed to load map.osm");
//!
//! let planner = wayplan::RoutePlanner::new(&model);
//! let route = planner
//!     .find_route(
//!         wayplan::Point::new(0.1, 0.1),
//!         wayplan::Point::new(0.9, 0.9),
//!         &wayplan::RouteOptions::default(),
//!     )
//!     .expect("failed to find route");
//!
//! println!("Route: {:?}", route);
//! ```

mod astar;
mod graph;
mod kd;
mod model;
pub mod osm;
mod planner;
mod projection;
mod rings;

pub use astar::{find_route, AStarError, Route, DEFAULT_STEP_LIMIT};
pub use graph::RoadGraph;
pub use kd::KDTree;
pub use model::{
    Bounds, Landuse, LanduseKind, Model, Multipolygon, Node, Railway, Road, RoadKind, Way,
};
pub use planner::{RouteOptions, RoutePlanner};
pub use projection::{euclidean_distance, Point, Projection};
pub use rings::{assemble_rings, RingAssembly};
