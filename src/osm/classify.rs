// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{LanduseKind, RoadKind};

/// Kind of area feature produced by an OSM way or relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Building,
    Leisure,
    Water,
    Landuse(LanduseKind),
}

/// Maps a [highway=*](https://wiki.openstreetmap.org/wiki/Key:highway) value onto a [RoadKind].
/// Returns `None` for values which are not routable.
pub fn road_kind(highway: &str) -> Option<RoadKind> {
    match highway {
        "motorway" | "motorway_link" => Some(RoadKind::Motorway),
        "trunk" => Some(RoadKind::Trunk),
        "primary" => Some(RoadKind::Primary),
        "secondary" => Some(RoadKind::Secondary),
        "tertiary" => Some(RoadKind::Tertiary),
        "residential" | "living_street" => Some(RoadKind::Residential),
        "service" => Some(RoadKind::Service),
        "unclassified" => Some(RoadKind::Unclassified),
        "footway" | "bridleway" | "steps" | "path" | "pedestrian" => Some(RoadKind::Footway),
        "cycleway" => Some(RoadKind::Cycleway),
        _ => None,
    }
}

/// Maps a [landuse=*](https://wiki.openstreetmap.org/wiki/Key:landuse) value onto a [LanduseKind].
pub fn landuse_kind(landuse: &str) -> Option<LanduseKind> {
    match landuse {
        "commercial" => Some(LanduseKind::Commercial),
        "construction" => Some(LanduseKind::Construction),
        "grass" => Some(LanduseKind::Grass),
        "forest" => Some(LanduseKind::Forest),
        "industrial" => Some(LanduseKind::Industrial),
        "railway" => Some(LanduseKind::Railway),
        "residential" => Some(LanduseKind::Residential),
        _ => None,
    }
}

/// Returns the road class and the display name of a way, if it's routable.
pub fn road(tags: &HashMap<String, String>) -> Option<(RoadKind, Option<String>)> {
    let highway = tags.get("highway")?;
    let kind = road_kind(highway)?;
    Some((kind, tags.get("name").cloned()))
}

pub fn is_railway(tags: &HashMap<String, String>) -> bool {
    tags.contains_key("railway")
}

/// Returns all area kinds matching the provided tags,
/// in the order: building, leisure, water, landuse.
///
/// A single way may describe multiple areas (e.g. `building=yes` with `landuse=retail`),
/// but never two of the same kind.
pub fn area_kinds(tags: &HashMap<String, String>) -> Vec<AreaKind> {
    let tag = |k: &str| tags.get(k).map(|v| v.as_str());
    let mut kinds = Vec::default();

    if tag("building").is_some() || tag("amenity") == Some("school") {
        kinds.push(AreaKind::Building);
    }

    if tag("leisure").is_some()
        || matches!(
            tag("natural"),
            Some("wood") | Some("tree_row") | Some("scrub") | Some("grassland")
        )
        || tag("landcover") == Some("grass")
    {
        kinds.push(AreaKind::Leisure);
    }

    if matches!(tag("natural"), Some("water") | Some("coastline")) {
        kinds.push(AreaKind::Water);
    }

    if let Some(landuse) = tag("landuse") {
        match landuse_kind(landuse) {
            Some(kind) => kinds.push(AreaKind::Landuse(kind)),
            None => log::debug!("unrecognized landuse={landuse}"),
        }
    }

    kinds
}

/// Returns the area kind of a relation - the first of [area_kinds].
pub fn relation_area_kind(tags: &HashMap<String, String>) -> Option<AreaKind> {
    area_kinds(tags).into_iter().next()
}
