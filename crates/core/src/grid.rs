//! Spatial dungeon graph: vertices on an integer lattice per floor, edges
//! bound to the compass exits they consume, and the lock/key registry.

mod collision;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::mem;

use rand_chacha::ChaCha8Rng;
use slotmap::{SlotMap, new_key_type};

use crate::directions::Directions;
use crate::locks::{Key, Lock, PlacedKey, PlacedLock};
use crate::seed::random_index;

pub use collision::STEP;

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct LockId;
    pub struct KeyId;
}

/// Closed axis-aligned box on one floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Rect {
    pub fn point(x: i64, y: i64) -> Self {
        Self { min_x: x, min_y: y, max_x: x, max_y: y }
    }

    pub fn around(a: (i64, i64), b: (i64, i64)) -> Self {
        Self { min_x: a.0.min(b.0), min_y: a.1.min(b.1), max_x: a.0.max(b.0), max_y: a.1.max(b.1) }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridVertex {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub exits: Directions,
    pub hallway: bool,
    pub top_exit: bool,
    pub bottom_exit: bool,
    pub side_objective: bool,
    pub locks: Vec<LockId>,
    pub keys: Vec<KeyId>,
}

impl GridVertex {
    fn new(x: i64, y: i64, z: i64) -> Self {
        Self {
            x,
            y,
            z,
            exits: Directions::NONE,
            hallway: false,
            top_exit: false,
            bottom_exit: false,
            side_objective: false,
            locks: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    pub fn free_exits(&self) -> Directions {
        Directions::ALL.difference(self.exits)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridEdge {
    pub from: VertexId,
    pub to: VertexId,
    /// Exit consumed at `from`; empty for inter-floor edges.
    pub from_direction: Directions,
    /// Exit consumed at `to`; empty for inter-floor edges.
    pub to_direction: Directions,
    pub bounds: Rect,
    /// Bend of an L-shaped corridor; `None` for straight edges.
    pub corner: Option<(i64, i64)>,
    pub min_z: i64,
    pub max_z: i64,
    pub hidden: bool,
}

impl GridEdge {
    pub fn is_inter_floor(&self) -> bool {
        self.min_z != self.max_z
    }

    pub fn other(&self, vertex: VertexId) -> VertexId {
        if self.from == vertex { self.to } else { self.from }
    }

    pub fn touches(&self, vertex: VertexId) -> bool {
        self.from == vertex || self.to == vertex
    }

    pub fn direction_at(&self, vertex: VertexId) -> Directions {
        if self.from == vertex { self.from_direction } else { self.to_direction }
    }

    /// Straight edges join two vertices sharing an axis.
    pub fn is_straight(&self) -> bool {
        self.corner.is_none()
    }

    /// Axis-aligned pieces of the corridor: one for straight edges, the
    /// horizontal and vertical legs for L-shaped ones.
    pub fn segments(&self) -> Vec<Rect> {
        let bounds = self.bounds;
        match self.corner {
            None => vec![bounds],
            Some((x, y)) => vec![
                Rect { min_y: y, max_y: y, ..bounds },
                Rect { min_x: x, max_x: x, ..bounds },
            ],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GridGraph {
    vertices: SlotMap<VertexId, GridVertex>,
    edges: SlotMap<EdgeId, GridEdge>,
    floor_edges: BTreeMap<i64, Vec<EdgeId>>,
    inter_floor_edges: Vec<EdgeId>,
    locks: SlotMap<LockId, PlacedLock>,
    keys: SlotMap<KeyId, PlacedKey>,
}

impl GridGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_grid_vertex(&mut self, x: i64, y: i64, z: i64) -> VertexId {
        self.vertices.insert(GridVertex::new(x, y, z))
    }

    /// Connects two vertices on the same floor through the given exits.
    /// Returns `None` when either exit is already taken.
    pub fn add_grid_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        from_exit: Directions,
        to_exit: Directions,
    ) -> Option<EdgeId> {
        if from == to || !from_exit.is_single() || !to_exit.is_single() {
            return None;
        }
        let source = self.vertices.get(from)?;
        let target = self.vertices.get(to)?;
        if source.z != target.z
            || source.exits.contains(from_exit)
            || target.exits.contains(to_exit)
        {
            return None;
        }
        let floor = source.z;
        let corner = if source.x == target.x || source.y == target.y {
            None
        } else if from_exit.is_horizontal() {
            Some((target.x, source.y))
        } else {
            Some((source.x, target.y))
        };
        let edge = GridEdge {
            from,
            to,
            from_direction: from_exit,
            to_direction: to_exit,
            bounds: Rect::around(source.position(), target.position()),
            corner,
            min_z: floor,
            max_z: floor,
            hidden: false,
        };
        let id = self.edges.insert(edge);
        self.vertices[from].exits.insert(from_exit);
        self.vertices[to].exits.insert(to_exit);
        self.floor_edges.entry(floor).or_default().push(id);
        Some(id)
    }

    /// Connects vertices on different floors. The lower end gains a top exit
    /// and the higher end a bottom exit; each may be used once.
    pub fn add_inter_floor_edge(&mut self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        let source = self.vertices.get(from)?;
        let target = self.vertices.get(to)?;
        if source.z == target.z {
            return None;
        }
        let (lower, higher) = if source.z < target.z { (from, to) } else { (to, from) };
        if self.vertices[lower].top_exit || self.vertices[higher].bottom_exit {
            return None;
        }
        let edge = GridEdge {
            from,
            to,
            from_direction: Directions::NONE,
            to_direction: Directions::NONE,
            bounds: Rect::around(source.position(), target.position()),
            corner: None,
            min_z: source.z.min(target.z),
            max_z: source.z.max(target.z),
            hidden: false,
        };
        let id = self.edges.insert(edge);
        self.vertices[lower].top_exit = true;
        self.vertices[higher].bottom_exit = true;
        self.inter_floor_edges.push(id);
        Some(id)
    }

    /// Deletes an edge, freeing the exits it held. Locks stop gating it.
    pub fn remove_grid_edge(&mut self, id: EdgeId) -> Option<GridEdge> {
        let edge = self.edges.remove(id)?;
        if edge.is_inter_floor() {
            let (lower, higher) = if self.vertex_z(edge.from) < self.vertex_z(edge.to) {
                (edge.from, edge.to)
            } else {
                (edge.to, edge.from)
            };
            if let Some(vertex) = self.vertices.get_mut(lower) {
                vertex.top_exit = false;
            }
            if let Some(vertex) = self.vertices.get_mut(higher) {
                vertex.bottom_exit = false;
            }
            self.inter_floor_edges.retain(|&other| other != id);
        } else {
            if let Some(vertex) = self.vertices.get_mut(edge.from) {
                vertex.exits.remove(edge.from_direction);
            }
            if let Some(vertex) = self.vertices.get_mut(edge.to) {
                vertex.exits.remove(edge.to_direction);
            }
            if let Some(ids) = self.floor_edges.get_mut(&edge.min_z) {
                ids.retain(|&other| other != id);
            }
        }
        for (_, placed) in &mut self.locks {
            placed.gated.retain(|&other| other != id);
        }
        Some(edge)
    }

    /// Swaps the endpoints of an edge. Each vertex keeps the exit it already
    /// used, so the edge keeps its id and any lock gating it.
    pub fn reverse(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.edges.get_mut(id) else {
            return false;
        };
        mem::swap(&mut edge.from, &mut edge.to);
        mem::swap(&mut edge.from_direction, &mut edge.to_direction);
        true
    }

    /// Replaces `id` by two halves meeting at a new vertex placed at
    /// `(x, y, z)`. The halves inherit the hidden flag and every lock gating
    /// the original edge.
    pub fn split_edge(
        &mut self,
        id: EdgeId,
        x: i64,
        y: i64,
        z: i64,
    ) -> Option<(VertexId, EdgeId, EdgeId)> {
        let edge = self.edges.get(id)?.clone();
        if edge.is_inter_floor() {
            if z <= edge.min_z || z >= edge.max_z {
                return None;
            }
        } else if z != edge.min_z {
            return None;
        }
        let gating = self.locks_gating(id);

        self.remove_grid_edge(id)?;
        let middle = self.add_grid_vertex(x, y, z);
        let (first, second) = if edge.is_inter_floor() {
            (
                self.add_inter_floor_edge(edge.from, middle)?,
                self.add_inter_floor_edge(middle, edge.to)?,
            )
        } else {
            self.vertices[middle].hallway = true;
            (
                self.add_grid_edge(
                    edge.from,
                    middle,
                    edge.from_direction,
                    edge.from_direction.opposite(),
                )?,
                self.add_grid_edge(
                    middle,
                    edge.to,
                    edge.to_direction.opposite(),
                    edge.to_direction,
                )?,
            )
        };
        self.edges[first].hidden = edge.hidden;
        self.edges[second].hidden = edge.hidden;
        for lock_id in gating {
            self.locks[lock_id].gated.extend([first, second]);
        }
        Some((middle, first, second))
    }

    pub fn set_hidden(&mut self, id: EdgeId, hidden: bool) {
        if let Some(edge) = self.edges.get_mut(id) {
            edge.hidden = hidden;
        }
    }

    pub fn set_side_objective(&mut self, vertex: VertexId) {
        if let Some(vertex) = self.vertices.get_mut(vertex) {
            vertex.side_objective = true;
        }
    }

    pub fn add_lock(&mut self, vertex: VertexId, lock: Lock, gated: Vec<EdgeId>) -> LockId {
        let id = self.locks.insert(PlacedLock { lock, vertex, gated });
        if let Some(vertex) = self.vertices.get_mut(vertex) {
            vertex.locks.push(id);
        }
        id
    }

    pub fn add_key(&mut self, vertex: VertexId, key: Key, locks: Vec<LockId>) -> KeyId {
        let id = self.keys.insert(PlacedKey { key, vertex, locks });
        if let Some(vertex) = self.vertices.get_mut(vertex) {
            vertex.keys.push(id);
        }
        id
    }

    pub fn lock(&self, id: LockId) -> Option<&PlacedLock> {
        self.locks.get(id)
    }

    pub fn key(&self, id: KeyId) -> Option<&PlacedKey> {
        self.keys.get(id)
    }

    pub fn locks(&self) -> impl Iterator<Item = (LockId, &PlacedLock)> {
        self.locks.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = (KeyId, &PlacedKey)> {
        self.keys.iter()
    }

    /// Makes an existing lock also gate `edge`.
    pub fn gate(&mut self, lock: LockId, edge: EdgeId) {
        if let Some(placed) = self.locks.get_mut(lock)
            && !placed.gated.contains(&edge)
        {
            placed.gated.push(edge);
        }
    }

    pub fn locks_gating(&self, edge: EdgeId) -> Vec<LockId> {
        self.locks
            .iter()
            .filter(|(_, placed)| placed.gated.contains(&edge))
            .map(|(id, _)| id)
            .collect()
    }

    /// Keys that open the given lock.
    pub fn keys_for(&self, lock: LockId) -> Vec<KeyId> {
        self.keys
            .iter()
            .filter(|(_, placed)| placed.locks.contains(&lock))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&GridVertex> {
        self.vertices.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&GridEdge> {
        self.edges.get(id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &GridVertex)> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &GridEdge)> {
        self.edges.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Distinct floor indices holding at least one vertex, ascending.
    pub fn floors(&self) -> Vec<i64> {
        self.vertices.values().map(|vertex| vertex.z).collect::<BTreeSet<_>>().into_iter().collect()
    }

    pub fn floor_edges(&self, floor: i64) -> &[EdgeId] {
        self.floor_edges.get(&floor).map_or(&[], Vec::as_slice)
    }

    pub fn inter_floor_edges(&self) -> &[EdgeId] {
        &self.inter_floor_edges
    }

    pub fn incident_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges.iter().filter(|(_, edge)| edge.touches(vertex)).map(|(id, _)| id).collect()
    }

    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges
            .iter()
            .find(|(_, edge)| (edge.from == a && edge.to == b) || (edge.from == b && edge.to == a))
            .map(|(id, _)| id)
    }

    /// Number of independent cycles: `edges - vertices + components`.
    pub fn cycle_rank(&self) -> usize {
        let mut seen = BTreeSet::new();
        let mut components = 0_usize;
        for start in self.vertices.keys() {
            if !seen.insert(start) {
                continue;
            }
            components += 1;
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                for id in self.incident_edges(current) {
                    let next = self.edges[id].other(current);
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        (self.edges.len() + components).saturating_sub(self.vertices.len())
    }

    /// Vertices reachable from `start` without crossing any `blocked` edge.
    pub fn reachable_from(&self, start: VertexId, blocked: &[EdgeId]) -> BTreeSet<VertexId> {
        let mut seen = BTreeSet::new();
        if !self.vertices.contains_key(start) {
            return seen;
        }
        seen.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for id in self.incident_edges(current) {
                if blocked.contains(&id) {
                    continue;
                }
                let next = self.edges[id].other(current);
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    pub fn get_random_floor_edge(
        &self,
        rng: &mut ChaCha8Rng,
        floor: i64,
        allow_hidden: bool,
    ) -> Option<EdgeId> {
        let eligible: Vec<EdgeId> = self
            .floor_edges(floor)
            .iter()
            .copied()
            .filter(|&id| allow_hidden || !self.edges[id].hidden)
            .collect();
        if eligible.is_empty() {
            return None;
        }
        Some(eligible[random_index(rng, eligible.len())])
    }

    pub fn get_random_interfloor_edge(&self, rng: &mut ChaCha8Rng) -> Option<EdgeId> {
        let eligible: Vec<EdgeId> =
            self.inter_floor_edges.iter().copied().filter(|&id| !self.edges[id].hidden).collect();
        if eligible.is_empty() {
            return None;
        }
        Some(eligible[random_index(rng, eligible.len())])
    }

    fn vertex_z(&self, id: VertexId) -> i64 {
        self.vertices.get(id).map_or(0, |vertex| vertex.z)
    }
}
