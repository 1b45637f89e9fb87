// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::f64::consts::FRAC_PI_4;

use crate::Bounds;

/// Equatorial radius of Earth (WGS 84), in meters.
/// Source: https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Position in the planar, normalized coordinate system of a [Model](crate::Model).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Calculates the straight-line distance between two planar points.
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[inline]
fn mercator_x(lon: f64) -> f64 {
    EARTH_RADIUS * lon.to_radians()
}

#[inline]
fn mercator_y(lat: f64) -> f64 {
    EARTH_RADIUS * (lat.to_radians() * 0.5 + FRAC_PI_4).tan().ln()
}

/// Maps geographic coordinates onto the normalized plane of a single document.
///
/// Positions are first projected with the
/// [spherical Mercator projection](https://en.wikipedia.org/wiki/Web_Mercator_projection),
/// then shifted so that the south-west corner of the [Bounds] lands at `(0, 0)`,
/// and finally scaled so that the larger side of the bounding box spans `[0, 1]`.
/// The shorter side spans `[0, 1/aspect_ratio]` (wide boxes) or `[0, aspect_ratio]` (tall boxes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    min_x: f64,
    min_y: f64,
    scale: f64,
    aspect_ratio: f64,
}

impl Projection {
    /// Creates a projection for the provided bounding box.
    ///
    /// Returns `None` if the box is degenerate: any coordinate is not finite,
    /// or the box has no extent along either axis.
    pub fn from_bounds(bounds: &Bounds) -> Option<Self> {
        let min_x = mercator_x(bounds.min_lon);
        let max_x = mercator_x(bounds.max_lon);
        let min_y = mercator_y(bounds.min_lat);
        let max_y = mercator_y(bounds.max_lat);

        let dx = max_x - min_x;
        let dy = max_y - min_y;
        if !(dx.is_finite() && dy.is_finite() && dx > 0.0 && dy > 0.0) {
            return None;
        }

        Some(Self {
            min_x,
            min_y,
            scale: dx.max(dy),
            aspect_ratio: dx / dy,
        })
    }

    /// Ratio of the width of the bounding box to its height, in projected space.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Number of (Mercator) meters corresponding to a unit of normalized distance.
    ///
    /// Mercator meters are only accurate at the equator; at latitude φ a real-world
    /// meter is stretched by a factor of `1 / cos(φ)`.
    pub fn metric_scale(&self) -> f64 {
        self.scale
    }

    /// Converts a geographic position into a normalized planar [Point].
    pub fn project(&self, lon: f64, lat: f64) -> Point {
        Point {
            x: (mercator_x(lon) - self.min_x) / self.scale,
            y: (mercator_y(lat) - self.min_y) / self.scale,
        }
    }

    /// Converts a normalized planar [Point] back into a `(lon, lat)` pair.
    pub fn unproject(&self, p: Point) -> (f64, f64) {
        let x = p.x * self.scale + self.min_x;
        let y = p.y * self.scale + self.min_y;
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
        (lon, lat)
    }

    /// Maps a point given relative to a square `[0, 1] × [0, 1]` area
    /// onto the actual extent of the projected bounding box.
    pub fn correct_query_point(&self, p: Point) -> Point {
        if self.aspect_ratio > 1.0 {
            Point::new(p.x, p.y / self.aspect_ratio)
        } else if self.aspect_ratio < 1.0 {
            Point::new(p.x * self.aspect_ratio, p.y)
        } else {
            p
        }
    }
}
