//! Placement primitives shared by the patterns. Every coordinate comes from
//! the grid's collision queries, and each primitive plans its geometry before
//! touching the graph, so a `Collision` leaves nothing behind. The one
//! exception is `complex_addition` on an L-shaped edge, which first splits
//! the bend into a hallway vertex.

use rand_chacha::ChaCha8Rng;

use crate::directions::Directions;
use crate::error::Collision;
use crate::grid::{EdgeId, GridEdge, GridVertex, Rect, VertexId};
use crate::seed::random_index;

use super::PatternContext;

const COMPLEX_ADDITION_DEPTH: u32 = 3;

/// A single new vertex joined to two existing ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidePath {
    pub vertex: VertexId,
    pub edges: [EdgeId; 2],
}

/// A new route running beside `bypassed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detour {
    pub vertices: Vec<VertexId>,
    /// Detour edges touching the ends of the bypassed edge.
    pub entrances: Vec<EdgeId>,
    pub edges: Vec<EdgeId>,
    pub bypassed: EdgeId,
    pub near: VertexId,
    pub far: VertexId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fork {
    pub vertex: VertexId,
    pub edge: EdgeId,
}

/// Stairs to a fresh vertex on another floor plus a dead-end corridor there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorFork {
    pub landing: VertexId,
    pub stair: EdgeId,
    pub corridor: Fork,
}

#[derive(Clone, Copy, Debug)]
struct SidePlan {
    side: Directions,
    offset: i64,
}

impl Detour {
    fn beside(bypassed: EdgeId, edge: &GridEdge, path: SidePath) -> Self {
        Self {
            vertices: vec![path.vertex],
            entrances: path.edges.to_vec(),
            edges: path.edges.to_vec(),
            bypassed,
            near: edge.from,
            far: edge.to,
        }
    }
}

impl PatternContext<'_> {
    /// Splits an edge at its midpoint, or at the bend of an L-shaped edge.
    pub fn add_extension(&mut self, edge: EdgeId) -> Result<(VertexId, EdgeId, EdgeId), Collision> {
        let corridor = self.edge_of(edge)?;
        if corridor.is_inter_floor() {
            return Err(Collision);
        }
        let point = match corridor.corner {
            Some(corner) => corner,
            None => {
                let (from, to) = self.endpoints(&corridor)?;
                if distance(from, to) < 2 {
                    return Err(Collision);
                }
                walk(from, to, distance(from, to) / 2)
            }
        };
        self.graph.split_edge(edge, point.0, point.1, corridor.min_z).ok_or(Collision)
    }

    /// Third vertex beside two vertices sharing an axis, where `dir` points
    /// from `a` to `b`. Both L-shaped legs leave through the same side.
    pub fn add_side_path(
        &mut self,
        a: VertexId,
        b: VertexId,
        dir: Directions,
    ) -> Result<SidePath, Collision> {
        let first = self.vertex_of(a)?;
        let second = self.vertex_of(b)?;
        if first.z != second.z
            || Directions::between(first.position(), second.position()) != Some(dir)
        {
            return Err(Collision);
        }
        let sides = first.free_exits() & second.free_exits();
        let plan = self
            .plan_side_path(first.position(), second.position(), sides, first.z)
            .ok_or(Collision)?;
        self.build_side_path(a, b, dir, plan)
    }

    /// Detour through the unused bend of an L-shaped edge's bounding box.
    pub fn add_corner_path(&mut self, edge: EdgeId) -> Result<SidePath, Collision> {
        let corridor = self.edge_of(edge)?;
        let corner = corridor.corner.ok_or(Collision)?;
        let (from, to) = self.endpoints(&corridor)?;
        let other = if corner == (to.0, from.1) { (from.0, to.1) } else { (to.0, from.1) };
        let toward_from = Directions::between(from, other).ok_or(Collision)?;
        let toward_to = Directions::between(to, other).ok_or(Collision)?;

        let free_from = self.vertex_of(corridor.from)?.free_exits();
        let free_to = self.vertex_of(corridor.to)?.free_exits();
        if !free_from.contains(toward_from) || !free_to.contains(toward_to) {
            return Err(Collision);
        }
        let floor = corridor.min_z;
        let first_leg = Rect::around(walk(from, other, 1), other);
        let second_leg = Rect::around(other, walk(to, other, 1));
        if !self.graph.is_clear(first_leg, floor) || !self.graph.is_clear(second_leg, floor) {
            return Err(Collision);
        }

        let vertex = self.graph.add_grid_vertex(other.0, other.1, floor);
        let first = self
            .graph
            .add_grid_edge(corridor.from, vertex, toward_from, toward_from.opposite())
            .ok_or(Collision)?;
        let second = self
            .graph
            .add_grid_edge(vertex, corridor.to, toward_to.opposite(), toward_to)
            .ok_or(Collision)?;
        Ok(SidePath { vertex, edges: [first, second] })
    }

    /// Splits the edge twice and runs a side path beside the fresh middle
    /// piece. When that piece is boxed in, the halves of the leg are tried
    /// in turn, `depth` levels deep.
    pub fn complex_addition(&mut self, edge: EdgeId, depth: u32) -> Result<Detour, Collision> {
        let corridor = self.edge_of(edge)?;
        if corridor.is_inter_floor() {
            return Err(Collision);
        }
        let (from, to) = self.endpoints(&corridor)?;
        let legs = match corridor.corner {
            None => vec![(from, to)],
            Some(corner) => vec![(from, corner), (corner, to)],
        };
        let mut order: Vec<usize> = (0..legs.len()).collect();
        shuffle(self.rng, &mut order);

        for index in order {
            let (leg_from, leg_to) = legs[index];
            let Some((p, q, plan)) = self.plan_inner_piece(leg_from, leg_to, corridor.min_z, depth)
            else {
                continue;
            };
            let mut target = edge;
            if corridor.corner.is_some() {
                let (_, first, second) = self.add_extension(edge)?;
                target = if index == 0 { first } else { second };
            }
            let (near, _, rest) =
                self.graph.split_edge(target, p.0, p.1, corridor.min_z).ok_or(Collision)?;
            let (far, inner, _) =
                self.graph.split_edge(rest, q.0, q.1, corridor.min_z).ok_or(Collision)?;
            let dir = Directions::between(p, q).ok_or(Collision)?;
            let path = self.build_side_path(near, far, dir, plan)?;
            return Ok(Detour {
                vertices: vec![path.vertex],
                entrances: path.edges.to_vec(),
                edges: path.edges.to_vec(),
                bypassed: inner,
                near,
                far,
            });
        }
        Err(Collision)
    }

    /// Side path, then corner path, then complex addition. New edges inherit
    /// the locks of the edge they run beside.
    pub fn add_detour(&mut self, edge: EdgeId) -> Result<Detour, Collision> {
        let corridor = self.edge_of(edge)?;
        let side_path = if corridor.is_straight() {
            let (from, to) = self.endpoints(&corridor)?;
            Directions::between(from, to)
                .ok_or(Collision)
                .and_then(|dir| self.add_side_path(corridor.from, corridor.to, dir))
        } else {
            self.add_corner_path(edge)
        };
        let detour = match side_path {
            Ok(path) => Detour::beside(edge, &corridor, path),
            Err(Collision) => self.complex_addition(edge, COMPLEX_ADDITION_DEPTH)?,
        };
        self.inherit_gating(detour.bypassed, &detour.edges);
        Ok(detour)
    }

    /// Dead-end branch leaving `vertex` through `dir`, or through any free
    /// exit when `dir` is `None`. A reversed fork points toward the vertex.
    pub fn add_fork(
        &mut self,
        vertex: VertexId,
        dir: Option<Directions>,
        reversed: bool,
    ) -> Result<Fork, Collision> {
        let base = self.vertex_of(vertex)?;
        let free = base.free_exits();
        let candidates = match dir {
            Some(dir) if free.contains(dir) => vec![dir],
            Some(_) => Vec::new(),
            None => shuffled(self.rng, free),
        };
        for dir in candidates {
            if let Some(target) = self.fork_target(base.position(), base.z, dir) {
                return self.build_fork(vertex, base.z, dir, target, reversed);
            }
        }
        Err(Collision)
    }

    /// Second staircase beside an inter-floor edge, joined to both of its
    /// ends by corridors leaving through the same exit.
    pub fn add_floor_cycle(&mut self, edge: EdgeId) -> Result<Detour, Collision> {
        let stairs = self.edge_of(edge)?;
        let (low, high) = self.stair_ends(&stairs)?;
        let bottom = self.vertex_of(low)?;
        let top = self.vertex_of(high)?;
        if bottom.position() != top.position() {
            return Err(Collision);
        }
        let (x, y) = bottom.position();
        let floors = (bottom.z, top.z);

        for dir in shuffled(self.rng, bottom.free_exits() & top.free_exits()) {
            let target = match dir {
                Directions::EAST | Directions::WEST => self
                    .graph
                    .get_new_x_across(x, y, y, floors, dir == Directions::EAST)
                    .map(|new_x| (new_x, y)),
                _ => self
                    .graph
                    .get_new_y_across(y, x, x, floors, dir == Directions::NORTH)
                    .map(|new_y| (x, new_y)),
            };
            let Some(target) = target else {
                continue;
            };

            let lower = self.graph.add_grid_vertex(target.0, target.1, bottom.z);
            let upper = self.graph.add_grid_vertex(target.0, target.1, top.z);
            let low_edge =
                self.graph.add_grid_edge(low, lower, dir, dir.opposite()).ok_or(Collision)?;
            let high_edge =
                self.graph.add_grid_edge(high, upper, dir, dir.opposite()).ok_or(Collision)?;
            let stair = if stairs.from == low {
                self.graph.add_inter_floor_edge(lower, upper)
            } else {
                self.graph.add_inter_floor_edge(upper, lower)
            }
            .ok_or(Collision)?;
            return Ok(Detour {
                vertices: vec![lower, upper],
                entrances: vec![low_edge, high_edge],
                edges: vec![low_edge, stair, high_edge],
                bypassed: edge,
                near: stairs.from,
                far: stairs.to,
            });
        }
        Err(Collision)
    }

    /// Landing on a new floor halfway between the lower end of a staircase
    /// and the next floor above it.
    pub fn add_inter_floor_extension(
        &mut self,
        edge: EdgeId,
    ) -> Result<(VertexId, EdgeId, EdgeId), Collision> {
        let stairs = self.edge_of(edge)?;
        let (low, _) = self.stair_ends(&stairs)?;
        let (x, y) = self.vertex_of(low)?.position();
        let next_floor = self
            .graph
            .floors()
            .into_iter()
            .find(|&floor| floor > stairs.min_z)
            .map_or(stairs.max_z, |floor| floor.min(stairs.max_z));
        let gap = next_floor - stairs.min_z;
        if gap < 2 {
            return Err(Collision);
        }
        self.graph.split_edge(edge, x, y, stairs.min_z + gap / 2).ok_or(Collision)
    }

    /// Floor cycle, falling back to a landing and a floor cycle beside either
    /// half of the split staircase.
    pub fn add_floor_detour(&mut self, edge: EdgeId) -> Result<Detour, Collision> {
        let detour = match self.add_floor_cycle(edge) {
            Ok(detour) => detour,
            Err(Collision) => {
                let (_, first, second) = self.add_inter_floor_extension(edge)?;
                let mut halves = [first, second];
                shuffle(self.rng, &mut halves);
                halves
                    .into_iter()
                    .find_map(|half| self.add_floor_cycle(half).ok())
                    .ok_or(Collision)?
            }
        };
        self.inherit_gating(detour.bypassed, &detour.edges);
        Ok(detour)
    }

    /// Staircase from `vertex` to a new dead-end floor above or below it.
    pub fn add_floor_fork(
        &mut self,
        vertex: VertexId,
        upward: bool,
    ) -> Result<FloorFork, Collision> {
        let base = self.vertex_of(vertex)?;
        if (upward && base.top_exit) || (!upward && base.bottom_exit) {
            return Err(Collision);
        }
        let (x, y) = base.position();
        let floor = self.graph.get_new_z(base.z, Rect::point(x, y), upward).ok_or(Collision)?;
        let (dir, target) = shuffled(self.rng, Directions::ALL)
            .into_iter()
            .find_map(|dir| self.fork_target((x, y), floor, dir).map(|target| (dir, target)))
            .ok_or(Collision)?;

        let landing = self.graph.add_grid_vertex(x, y, floor);
        let stair = self.graph.add_inter_floor_edge(vertex, landing).ok_or(Collision)?;
        let corridor = self.build_fork(landing, floor, dir, target, false)?;
        Ok(FloorFork { landing, stair, corridor })
    }

    fn plan_side_path(
        &mut self,
        from: (i64, i64),
        to: (i64, i64),
        sides: Directions,
        floor: i64,
    ) -> Option<SidePlan> {
        let dir = Directions::between(from, to)?;
        if distance(from, to) < 2 {
            return None;
        }
        for side in shuffled(self.rng, sides & dir.perpendicular()) {
            let offset = if dir.is_horizontal() {
                self.graph.get_new_y(from.1, from.0, to.0, floor, side == Directions::NORTH)
            } else {
                self.graph.get_new_x(from.0, from.1, to.1, floor, side == Directions::EAST)
            };
            if let Some(offset) = offset {
                return Some(SidePlan { side, offset });
            }
        }
        None
    }

    fn plan_inner_piece(
        &mut self,
        from: (i64, i64),
        to: (i64, i64),
        floor: i64,
        depth: u32,
    ) -> Option<((i64, i64), (i64, i64), SidePlan)> {
        let length = distance(from, to);
        if depth == 0 || length < 6 {
            return None;
        }
        let p = walk(from, to, length / 3);
        let q = walk(from, to, 2 * length / 3);
        if let Some(plan) = self.plan_side_path(p, q, Directions::ALL, floor) {
            return Some((p, q, plan));
        }
        let middle = walk(from, to, length / 2);
        let mut halves = [(from, middle), (middle, to)];
        shuffle(self.rng, &mut halves);
        halves.into_iter().find_map(|(a, b)| self.plan_inner_piece(a, b, floor, depth - 1))
    }

    fn build_side_path(
        &mut self,
        a: VertexId,
        b: VertexId,
        dir: Directions,
        plan: SidePlan,
    ) -> Result<SidePath, Collision> {
        let first = self.vertex_of(a)?;
        let second = self.vertex_of(b)?;
        let (from, to) = (first.position(), second.position());
        let middle = walk(from, to, distance(from, to) / 2);
        let position =
            if dir.is_horizontal() { (middle.0, plan.offset) } else { (plan.offset, middle.1) };

        let vertex = self.graph.add_grid_vertex(position.0, position.1, first.z);
        let leading =
            self.graph.add_grid_edge(a, vertex, plan.side, dir.opposite()).ok_or(Collision)?;
        let trailing = self.graph.add_grid_edge(vertex, b, dir, plan.side).ok_or(Collision)?;
        Ok(SidePath { vertex, edges: [leading, trailing] })
    }

    fn fork_target(&self, from: (i64, i64), floor: i64, dir: Directions) -> Option<(i64, i64)> {
        match dir {
            Directions::EAST | Directions::WEST => self
                .graph
                .get_new_x(from.0, from.1, from.1, floor, dir == Directions::EAST)
                .map(|x| (x, from.1)),
            Directions::NORTH | Directions::SOUTH => self
                .graph
                .get_new_y(from.1, from.0, from.0, floor, dir == Directions::NORTH)
                .map(|y| (from.0, y)),
            _ => None,
        }
    }

    fn build_fork(
        &mut self,
        vertex: VertexId,
        floor: i64,
        dir: Directions,
        target: (i64, i64),
        reversed: bool,
    ) -> Result<Fork, Collision> {
        let dead_end = self.graph.add_grid_vertex(target.0, target.1, floor);
        let edge = if reversed {
            self.graph.add_grid_edge(dead_end, vertex, dir.opposite(), dir)
        } else {
            self.graph.add_grid_edge(vertex, dead_end, dir, dir.opposite())
        }
        .ok_or(Collision)?;
        Ok(Fork { vertex: dead_end, edge })
    }

    fn stair_ends(&self, stairs: &GridEdge) -> Result<(VertexId, VertexId), Collision> {
        if !stairs.is_inter_floor() {
            return Err(Collision);
        }
        let from = self.vertex_of(stairs.from)?;
        Ok(if from.z == stairs.min_z { (stairs.from, stairs.to) } else { (stairs.to, stairs.from) })
    }

    fn edge_of(&self, edge: EdgeId) -> Result<GridEdge, Collision> {
        self.graph.edge(edge).cloned().ok_or(Collision)
    }

    fn vertex_of(&self, vertex: VertexId) -> Result<GridVertex, Collision> {
        self.graph.vertex(vertex).cloned().ok_or(Collision)
    }

    fn endpoints(&self, edge: &GridEdge) -> Result<((i64, i64), (i64, i64)), Collision> {
        Ok((self.vertex_of(edge.from)?.position(), self.vertex_of(edge.to)?.position()))
    }
}

fn distance(a: (i64, i64), b: (i64, i64)) -> i64 {
    (b.0 - a.0).abs() + (b.1 - a.1).abs()
}

/// Point `steps` units from `from` toward the axis-aligned `to`.
fn walk(from: (i64, i64), to: (i64, i64), steps: i64) -> (i64, i64) {
    let (dx, dy) = Directions::between(from, to).map_or((0, 0), Directions::delta);
    (from.0 + dx * steps, from.1 + dy * steps)
}

fn shuffle<T>(rng: &mut ChaCha8Rng, items: &mut [T]) {
    for index in (1..items.len()).rev() {
        items.swap(index, random_index(rng, index + 1));
    }
}

/// Members of `remaining` in random order.
fn shuffled(rng: &mut ChaCha8Rng, mut remaining: Directions) -> Vec<Directions> {
    let mut order = Vec::with_capacity(remaining.count() as usize);
    while let Some(dir) = remaining.random_choice(rng) {
        remaining.remove(dir);
        order.push(dir);
    }
    order
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::grid::{GridGraph, STEP};
    use crate::locks::Lock;
    use crate::pattern::tests::seed_corridor;

    fn context<'a>(
        graph: &'a mut GridGraph,
        rng: &'a mut ChaCha8Rng,
        start: VertexId,
    ) -> PatternContext<'a> {
        PatternContext { graph, rng, start, dangers: &[] }
    }

    #[test]
    fn side_path_forms_a_triangle_with_l_shaped_legs() {
        let (mut graph, start, end, _) = seed_corridor();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ctx = context(&mut graph, &mut rng, start);
        let path = ctx.add_side_path(start, end, Directions::EAST).expect("open floor");
        let middle = ctx.graph.vertex(path.vertex).expect("added").clone();
        assert_eq!(middle.x, STEP / 2);
        assert_eq!(middle.y.abs(), STEP);
        assert_eq!(middle.exits, Directions::EAST | Directions::WEST);
        assert!(
            path.edges.iter().all(|&edge| ctx.graph.edge(edge).is_some_and(|e| !e.is_straight()))
        );
        assert_eq!(ctx.graph.cycle_rank(), 1);
    }

    #[test]
    fn detours_fall_back_to_complex_addition_once_both_sides_are_used() {
        let (mut graph, start, end, edge) = seed_corridor();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut ctx = context(&mut graph, &mut rng, start);
        let first = ctx.add_detour(edge).expect("north or south is open");
        let second = ctx.add_detour(edge).expect("the other side is open");
        assert_eq!((first.bypassed, second.bypassed), (edge, edge));
        assert!(ctx.graph.vertex(start).is_some_and(|v| v.free_exits() == Directions::WEST));

        let third = ctx.add_detour(edge).expect("splitting frees new exits");
        assert_ne!(third.bypassed, edge);
        assert!(ctx.graph.edge(edge).is_none(), "bypassed corridor was split");
        assert_eq!(ctx.graph.cycle_rank(), 3);
        assert_eq!(ctx.graph.reachable_from(start, &[]).len(), ctx.graph.vertex_count());
        assert!(ctx.graph.reachable_from(start, &[]).contains(&end));
    }

    #[test]
    fn corner_path_uses_the_free_bend() {
        let mut graph = GridGraph::new();
        let a = graph.add_grid_vertex(0, 0, 0);
        let b = graph.add_grid_vertex(100, 100, 0);
        let edge =
            graph.add_grid_edge(a, b, Directions::NORTH, Directions::WEST).expect("free exits");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = context(&mut graph, &mut rng, a);
        let path = ctx.add_corner_path(edge).expect("bend at (100, 0) is free");
        assert_eq!(ctx.graph.vertex(path.vertex).map(GridVertex::position), Some((100, 0)));
        let exits = |vertex| ctx.graph.vertex(vertex).map(|v| v.exits);
        assert_eq!(exits(a), Some(Directions::NORTH | Directions::EAST));
        assert_eq!(exits(b), Some(Directions::WEST | Directions::SOUTH));
    }

    #[test]
    fn corner_path_is_refused_when_the_bend_is_occupied() {
        let mut graph = GridGraph::new();
        let a = graph.add_grid_vertex(0, 0, 0);
        let b = graph.add_grid_vertex(100, 100, 0);
        let edge =
            graph.add_grid_edge(a, b, Directions::NORTH, Directions::WEST).expect("free exits");
        graph.add_grid_vertex(100, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = context(&mut graph, &mut rng, a);
        assert_eq!(ctx.add_corner_path(edge), Err(Collision));
        assert_eq!(ctx.graph.vertex_count(), 3, "nothing was added");
    }

    #[test]
    fn extension_splits_l_edges_at_the_bend() {
        let mut graph = GridGraph::new();
        let a = graph.add_grid_vertex(0, 0, 0);
        let b = graph.add_grid_vertex(40, 60, 0);
        let edge =
            graph.add_grid_edge(a, b, Directions::EAST, Directions::SOUTH).expect("free exits");
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut ctx = context(&mut graph, &mut rng, a);
        let (middle, first, second) = ctx.add_extension(edge).expect("bend exists");
        assert_eq!(ctx.graph.vertex(middle).map(GridVertex::position), Some((40, 0)));
        assert!(ctx.graph.edge(first).is_some_and(GridEdge::is_straight));
        assert!(ctx.graph.edge(second).is_some_and(GridEdge::is_straight));
    }

    #[test]
    fn fork_respects_requested_direction_and_reversal() {
        let (mut graph, start, _, _) = seed_corridor();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ctx = context(&mut graph, &mut rng, start);
        assert_eq!(ctx.add_fork(start, Some(Directions::EAST), false), Err(Collision));
        let fork = ctx.add_fork(start, Some(Directions::WEST), true).expect("west is open");
        let edge = ctx.graph.edge(fork.edge).expect("added").clone();
        assert_eq!((edge.from, edge.to), (fork.vertex, start));
        assert_eq!(ctx.graph.vertex(fork.vertex).map(GridVertex::position), Some((-STEP, 0)));
    }

    #[test]
    fn floor_cycle_and_landing_grow_beside_stairs() {
        let mut graph = GridGraph::new();
        let low = graph.add_grid_vertex(0, 0, 0);
        let high = graph.add_grid_vertex(0, 0, STEP);
        let stairs = graph.add_inter_floor_edge(low, high).expect("different floors");
        let lock = graph.add_lock(low, Lock::Camera, vec![stairs]);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut ctx = context(&mut graph, &mut rng, low);

        let detour = ctx.add_floor_detour(stairs).expect("open floors");
        assert_eq!(detour.vertices.len(), 2);
        assert_eq!(ctx.graph.inter_floor_edges().len(), 2);
        assert!(detour.edges.iter().all(|edge| ctx.graph.locks_gating(*edge) == vec![lock]));

        let (landing, _, _) = ctx.add_inter_floor_extension(stairs).expect("floors are far apart");
        assert_eq!(ctx.graph.vertex(landing).map(|v| v.z), Some(STEP / 2));
        assert_eq!(ctx.graph.floors(), vec![0, STEP / 2, STEP]);
    }

    #[test]
    fn floor_fork_opens_a_new_floor() {
        let (mut graph, start, end, _) = seed_corridor();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut ctx = context(&mut graph, &mut rng, start);
        let fork = ctx.add_floor_fork(end, true).expect("nothing above");
        assert_eq!(ctx.graph.vertex(fork.landing).map(|v| v.z), Some(STEP));
        assert!(ctx.graph.vertex(end).is_some_and(|v| v.top_exit));
        assert_eq!(ctx.add_floor_fork(end, true), Err(Collision), "top exit already used");
        assert_eq!(ctx.graph.floor_edges(STEP).len(), 1);
    }

    #[test]
    fn shuffled_exits_are_a_permutation_and_walks_follow_the_axis() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let free = Directions::NORTH | Directions::EAST | Directions::WEST;
        for _ in 0..16 {
            let order = shuffled(&mut rng, free);
            assert_eq!(order.len(), 3);
            assert_eq!(order.iter().fold(Directions::NONE, |all, &dir| all | dir), free);
        }
        assert!(shuffled(&mut rng, Directions::NONE).is_empty());

        assert_eq!(walk((0, 0), (0, -10), 4), (0, -4));
        assert_eq!(walk((5, 2), (1, 2), 3), (2, 2));
        assert_eq!(walk((5, 2), (5, 2), 3), (5, 2));
    }
}
