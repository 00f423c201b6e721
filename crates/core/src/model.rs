//! Finished drawing of a level graph and the placement sites it resolves.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use slotmap::Key;
use xxhash_rust::xxh3::xxh3_64;

use crate::directions::Directions;
use crate::grid::{GridGraph, VertexId};
use crate::locks::{Scene, Site};

/// Integer position in drawing space. `z` is the floor rank, not the raw
/// floor coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DrawPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// Axis-aligned segment, stored with `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Segment {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl Segment {
    pub fn horizontal(y: i64, x_a: i64, x_b: i64) -> Self {
        Self { x1: x_a.min(x_b), y1: y, x2: x_a.max(x_b), y2: y }
    }

    pub fn vertical(x: i64, y_a: i64, y_b: i64) -> Self {
        Self { x1: x, y1: y_a.min(y_b), x2: x, y2: y_a.max(y_b) }
    }

    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    /// True when the open interiors of two collinear segments overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_horizontal() && other.is_horizontal() {
            self.y1 == other.y1 && self.x1 < other.x2 && other.x1 < self.x2
        } else if !self.is_horizontal() && !other.is_horizontal() {
            self.x1 == other.x1 && self.y1 < other.y2 && other.y1 < self.y2
        } else {
            false
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphDrawing {
    pub vertex_positions: BTreeMap<VertexId, DrawPos>,
    pub horizontal_lines: BTreeSet<Segment>,
    pub vertical_lines: BTreeSet<Segment>,
    pub maximum_x: i64,
    pub maximum_y: i64,
    pub maximum_z: i64,
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
}

impl GraphDrawing {
    pub fn position(&self, vertex: VertexId) -> Option<DrawPos> {
        self.vertex_positions.get(&vertex).copied()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.vertex_positions.len() as u32).to_le_bytes());
        for (vertex, pos) in &self.vertex_positions {
            bytes.extend(vertex.data().as_ffi().to_le_bytes());
            bytes.extend(pos.x.to_le_bytes());
            bytes.extend(pos.y.to_le_bytes());
            bytes.extend(pos.z.to_le_bytes());
        }
        for lines in [&self.horizontal_lines, &self.vertical_lines] {
            bytes.extend((lines.len() as u32).to_le_bytes());
            for segment in lines {
                for coordinate in [segment.x1, segment.y1, segment.x2, segment.y2] {
                    bytes.extend(coordinate.to_le_bytes());
                }
            }
        }
        bytes.extend(self.maximum_x.to_le_bytes());
        bytes.extend(self.maximum_y.to_le_bytes());
        bytes.extend(self.maximum_z.to_le_bytes());
        bytes.extend(self.start_vertex.data().as_ffi().to_le_bytes());
        bytes.extend(self.end_vertex.data().as_ffi().to_le_bytes());
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// Placement site of `vertex`. Doorways are the exits leading into edges
    /// gated by locks standing on that vertex.
    pub fn site_of(&self, vertex: VertexId, graph: &GridGraph) -> Option<Site> {
        let position = self.position(vertex)?;
        let grid_vertex = graph.vertex(vertex)?;
        let mut doorways = Directions::NONE;
        for lock in grid_vertex.locks.iter().filter_map(|&id| graph.lock(id)) {
            for edge in lock.gated.iter().filter_map(|&id| graph.edge(id)) {
                if edge.touches(vertex) {
                    doorways.insert(edge.direction_at(vertex));
                }
            }
        }
        Some(Site { vertex, position, doorways, hallway: grid_vertex.hallway })
    }

    /// Hands every lock and key of `graph` to `scene` at its resolved site.
    /// Pickups get no doorways.
    pub fn furnish(&self, graph: &GridGraph, scene: &mut impl Scene) {
        for (_, placed) in graph.locks() {
            if let Some(site) = self.site_of(placed.vertex, graph) {
                placed.lock.implement(&site, scene);
            }
        }
        for (_, placed) in graph.keys() {
            if let Some(site) = self.site_of(placed.vertex, graph) {
                let site = Site { doorways: Directions::NONE, ..site };
                placed.key.implement(&site, scene);
            }
        }
    }
}
