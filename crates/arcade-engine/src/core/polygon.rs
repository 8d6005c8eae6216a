//! Convex (or at least simple) polygons used as collision regions.
//!
//! The bounding box is cached and recomputed after every vertex change, so
//! `min`/`max` are always the tight AABB of the current vertices.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, Result};

/// Minimum number of vertices a polygon may have.
pub const MIN_VERTICES: usize = 3;

/// An edge of a polygon: `start -> end`, where `index` is the start vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub index: usize,
    pub start: Vec2,
    pub end: Vec2,
}

impl Edge {
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonRecord", into = "PolygonRecord")]
pub struct Polygon {
    vertices: Vec<Vec2>,
    min: Vec2,
    max: Vec2,
    inverted: bool,
}

impl Polygon {
    /// Build a polygon from at least three vertices.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < MIN_VERTICES {
            return Err(EngineError::PolygonTooSmall { vertices: vertices.len() });
        }
        let mut polygon = Self {
            vertices,
            min: Vec2::ZERO,
            max: Vec2::ZERO,
            inverted: false,
        };
        polygon.recompute_bounds();
        Ok(polygon)
    }

    /// Axis-aligned rectangle with its top-left corner at `min`.
    pub fn rect(min: Vec2, size: Vec2) -> Self {
        let max = min + size;
        Self {
            vertices: vec![min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
            min: min.min(max),
            max: min.max(max),
            inverted: false,
        }
    }

    /// An inverted polygon collides with points *outside* it (e.g. arena walls).
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether `point` lies inside the bounding box (edges inclusive).
    pub fn bounds_contain(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Translate every vertex (and the bounding box) by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
        self.min += delta;
        self.max += delta;
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.translate(Vec2::new(dx, dy));
    }

    /// Translate so the bounding-box centre lands on `point`.
    pub fn move_to(&mut self, point: Vec2) {
        self.translate(point - self.center());
    }

    /// Ray-crossing point-in-polygon test. Negated for inverted polygons.
    pub fn contains(&self, point: Vec2) -> bool {
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > point.y) != (b.y > point.y) {
                let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside != self.inverted
    }

    pub fn edge(&self, index: usize) -> Edge {
        let n = self.vertices.len();
        let index = index % n;
        Edge {
            index,
            start: self.vertices[index],
            end: self.vertices[(index + 1) % n],
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertices.len()).map(move |i| self.edge(i))
    }

    /// First edge crossed by the path `from -> to`, if any.
    ///
    /// This is the swept-collision primitive: which boundary did a moving
    /// point cross this frame?
    pub fn intersecting_edge(&self, from: Vec2, to: Vec2) -> Option<Edge> {
        self.edges()
            .find(|edge| segments_intersect(from, to, edge.start, edge.end))
    }

    /// Midpoint of the edge starting at `index`; used for editor handles.
    pub fn edge_midpoint(&self, index: usize) -> Result<Vec2> {
        self.check_index(index)?;
        Ok(self.edge(index).midpoint())
    }

    pub fn move_vertex(&mut self, index: usize, to: Vec2) -> Result<()> {
        self.check_index(index)?;
        self.vertices[index] = to;
        self.recompute_bounds();
        Ok(())
    }

    /// Insert a vertex between `index` and its successor.
    pub fn add_vertex_after(&mut self, index: usize, vertex: Vec2) -> Result<()> {
        self.check_index(index)?;
        self.vertices.insert(index + 1, vertex);
        self.recompute_bounds();
        Ok(())
    }

    /// Remove a vertex. Refuses to drop below three vertices.
    pub fn remove_vertex_at(&mut self, index: usize) -> Result<Vec2> {
        self.check_index(index)?;
        if self.vertices.len() <= MIN_VERTICES {
            return Err(EngineError::PolygonTooSmall { vertices: self.vertices.len() - 1 });
        }
        let removed = self.vertices.remove(index);
        self.recompute_bounds();
        Ok(removed)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.vertices.len() {
            Ok(())
        } else {
            Err(EngineError::VertexOutOfRange { index, len: self.vertices.len() })
        }
    }

    fn recompute_bounds(&mut self) {
        let (min, max) = self.vertices.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), v| (min.min(*v), max.max(*v)),
        );
        self.min = min;
        self.max = max;
    }
}

/// Proper or touching intersection of segments `p1-p2` and `q1-q2`.
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear / endpoint-touching cases
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

#[inline]
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

#[inline]
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Wire form of a polygon for level records.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolygonRecord {
    vertices: Vec<[f32; 2]>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    inverted: bool,
}

impl TryFrom<PolygonRecord> for Polygon {
    type Error = EngineError;

    fn try_from(record: PolygonRecord) -> Result<Self> {
        let mut polygon = Polygon::new(record.vertices.into_iter().map(Vec2::from).collect())?;
        polygon.inverted = record.inverted;
        Ok(polygon)
    }
}

impl From<Polygon> for PolygonRecord {
    fn from(polygon: Polygon) -> Self {
        Self {
            vertices: polygon.vertices.iter().map(|v| v.to_array()).collect(),
            inverted: polygon.inverted,
        }
    }
}
