//! Incremental collision queries. New coordinates are only ever produced by
//! these sweeps, so fresh geometry never overlaps what is already placed.

use super::{GridGraph, Rect};

/// Distance moved when nothing obstructs the requested direction.
pub const STEP: i64 = 1 << 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Rect {
    fn along(&self, axis: Axis) -> (i64, i64) {
        match axis {
            Axis::X => (self.min_x, self.max_x),
            Axis::Y => (self.min_y, self.max_y),
        }
    }

    fn across(&self, axis: Axis) -> (i64, i64) {
        match axis {
            Axis::X => (self.min_y, self.max_y),
            Axis::Y => (self.min_x, self.max_x),
        }
    }
}

impl GridGraph {
    /// New x for a vertical run over `[y_min, y_max]` moved off `old_x`.
    /// With nothing in the way the run lands a full [`STEP`] off `old_x` on
    /// the requested side: `old_x + STEP` rightward, `old_x - STEP` leftward.
    pub fn get_new_x(
        &self,
        old_x: i64,
        y_min: i64,
        y_max: i64,
        floor: i64,
        rightward: bool,
    ) -> Option<i64> {
        self.get_new_x_across(old_x, y_min, y_max, (floor, floor), rightward)
    }

    /// New y for a horizontal run over `[x_min, x_max]` moved off `old_y`.
    pub fn get_new_y(
        &self,
        old_y: i64,
        x_min: i64,
        x_max: i64,
        floor: i64,
        upward: bool,
    ) -> Option<i64> {
        self.get_new_y_across(old_y, x_min, x_max, (floor, floor), upward)
    }

    /// Like [`GridGraph::get_new_x`] but clear on every floor in `floors`.
    pub fn get_new_x_across(
        &self,
        old_x: i64,
        y_min: i64,
        y_max: i64,
        floors: (i64, i64),
        rightward: bool,
    ) -> Option<i64> {
        self.sweep(Axis::X, old_x, (y_min.min(y_max), y_min.max(y_max)), floors, rightward)
    }

    pub fn get_new_y_across(
        &self,
        old_y: i64,
        x_min: i64,
        x_max: i64,
        floors: (i64, i64),
        upward: bool,
    ) -> Option<i64> {
        self.sweep(Axis::Y, old_y, (x_min.min(x_max), x_min.max(x_max)), floors, upward)
    }

    /// New floor for geometry covering `rect`, moved off `old_z`.
    pub fn get_new_z(&self, old_z: i64, rect: Rect, upward: bool) -> Option<i64> {
        let mut nearest: Option<i64> = None;
        let mut consider = |min_z: i64, max_z: i64| {
            let distance = if upward {
                if max_z <= old_z {
                    return;
                }
                (min_z - old_z).max(0)
            } else {
                if min_z >= old_z {
                    return;
                }
                (old_z - max_z).max(0)
            };
            nearest = Some(nearest.map_or(distance, |best| best.min(distance)));
        };

        for vertex in self.vertices.values() {
            if rect.intersects(&Rect::point(vertex.x, vertex.y)) {
                consider(vertex.z, vertex.z);
            }
        }
        for edge in self.edges.values() {
            if edge.segments().iter().any(|segment| rect.intersects(segment)) {
                consider(edge.min_z, edge.max_z);
            }
        }
        resolve(old_z, nearest, upward)
    }

    /// True when nothing placed on `floor`, including stairs passing through
    /// it, touches `rect`.
    pub fn is_clear(&self, rect: Rect, floor: i64) -> bool {
        self.obstacles(floor, floor).iter().all(|obstacle| !obstacle.intersects(&rect))
    }

    fn obstacles(&self, low_floor: i64, high_floor: i64) -> Vec<Rect> {
        let mut obstacles: Vec<Rect> = self
            .vertices
            .values()
            .filter(|vertex| vertex.z >= low_floor && vertex.z <= high_floor)
            .map(|vertex| Rect::point(vertex.x, vertex.y))
            .collect();
        for (_, ids) in self.floor_edges.range(low_floor..=high_floor) {
            obstacles.extend(ids.iter().flat_map(|&id| self.edges[id].segments()));
        }
        obstacles.extend(
            self.inter_floor_edges
                .iter()
                .map(|&id| &self.edges[id])
                .filter(|edge| edge.min_z <= high_floor && edge.max_z >= low_floor)
                .flat_map(|edge| edge.segments()),
        );
        obstacles
    }

    fn sweep(
        &self,
        axis: Axis,
        old: i64,
        span: (i64, i64),
        floors: (i64, i64),
        positive: bool,
    ) -> Option<i64> {
        let obstacles = self.obstacles(floors.0.min(floors.1), floors.0.max(floors.1));
        let mut nearest: Option<i64> = None;
        for obstacle in obstacles {
            let (across_min, across_max) = obstacle.across(axis);
            if across_max < span.0 || across_min > span.1 {
                continue;
            }
            let (along_min, along_max) = obstacle.along(axis);
            let distance = if positive {
                if along_max <= old {
                    continue;
                }
                (along_min - old).max(0)
            } else {
                if along_min >= old {
                    continue;
                }
                (old - along_max).max(0)
            };
            nearest = Some(nearest.map_or(distance, |best| best.min(distance)));
        }
        resolve(old, nearest, positive)
    }
}

/// Halfway to the nearest obstacle, a full step when the way is clear, and
/// nothing when the gap cannot hold a new coordinate.
fn resolve(old: i64, nearest: Option<i64>, positive: bool) -> Option<i64> {
    let offset = match nearest {
        None => STEP,
        Some(distance) if distance < 2 => return None,
        Some(distance) => distance / 2,
    };
    Some(if positive { old + offset } else { old - offset })
}
