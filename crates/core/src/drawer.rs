//! Planar orthogonal drawing of a finished level graph. Every vertex becomes
//! a horizontal bar at its st-number and every corridor a vertical line
//! between the bars of its ends.

mod embedding;
mod visibility;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{DrawError, GraphError};
use crate::grid::{GridGraph, VertexId};
use crate::model::{DrawPos, GraphDrawing, Segment};

use embedding::{Link, link};

pub struct GraphDrawer<'a> {
    graph: &'a GridGraph,
    start: VertexId,
    end: VertexId,
}

/// Index-based copy of the grid graph. Neighbours are ordered clockwise by
/// the exit they leave through, stairs last.
struct Topology {
    ids: Vec<VertexId>,
    floors: Vec<i64>,
    adjacency: Vec<Vec<usize>>,
    corridors: BTreeSet<Link>,
}

impl<'a> GraphDrawer<'a> {
    pub fn new(graph: &'a GridGraph, start: VertexId, end: VertexId) -> Self {
        Self { graph, start, end }
    }

    pub fn draw(&self) -> Result<GraphDrawing, DrawError> {
        if self.graph.vertex_count() == 0 {
            return Err(DrawError::Empty);
        }
        let topology = self.topology();
        let terminal = |id| topology.ids.iter().position(|&other| other == id);
        let (Some(source), Some(sink)) = (terminal(self.start), terminal(self.end)) else {
            return Err(DrawError::MissingTerminal);
        };
        if source == sink {
            return Err(GraphError::SameEndpoints.into());
        }

        let mut adjacency = topology.adjacency.clone();
        if !adjacency[source].contains(&sink) {
            adjacency[source].push(sink);
            adjacency[sink].push(source);
        }
        let reached = embedding::to_graph(&adjacency).depth_first_search(source).preorder.len();
        if reached != adjacency.len() {
            return Err(GraphError::Disconnected.into());
        }

        let mut rotation = embedding::embed(&adjacency, source)?;
        let augmented = embedding::biconnect(&mut rotation, source);
        let faces = embedding::trace_faces(&rotation);
        let links = embedding::links(&rotation);
        if faces.boundaries.len() + rotation.len() != links.len() + 2 {
            return Err(DrawError::NonPlanar);
        }
        let outer = faces.face_of.get(&(sink, source)).copied().ok_or(DrawError::NonPlanar)?;
        debug!(
            vertices = rotation.len(),
            faces = faces.boundaries.len(),
            augmented = augmented.len(),
            "embedded level graph"
        );

        let st = embedding::to_graph(&rotation)
            .st_numbering(source, sink)?
            .into_iter()
            .collect::<Option<Vec<usize>>>()
            .ok_or(GraphError::Disconnected)?;
        let columns = visibility::edge_columns(&faces, outer, &st, &links);

        Ok(self.layout(&topology, &st, &columns))
    }

    fn topology(&self) -> Topology {
        let ids: Vec<VertexId> = self.graph.vertices().map(|(id, _)| id).collect();
        let index: BTreeMap<VertexId, usize> =
            ids.iter().enumerate().map(|(at, &id)| (id, at)).collect();

        let mut around: Vec<Vec<(u8, usize)>> = vec![Vec::new(); ids.len()];
        let mut corridors = BTreeSet::new();
        for (_, edge) in self.graph.edges() {
            let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
                continue;
            };
            if from == to || !corridors.insert(link(from, to)) {
                continue;
            }
            around[from].push((edge.from_direction.compass_rank(), to));
            around[to].push((edge.to_direction.compass_rank(), from));
        }
        let adjacency = around
            .into_iter()
            .map(|mut exits| {
                exits.sort_unstable();
                exits.into_iter().map(|(_, other)| other).collect()
            })
            .collect();

        Topology { ids, floors: self.graph.floors(), adjacency, corridors }
    }

    fn layout(
        &self,
        topology: &Topology,
        st: &[usize],
        columns: &BTreeMap<Link, i64>,
    ) -> GraphDrawing {
        let mut used: Vec<i64> =
            topology.corridors.iter().filter_map(|edge| columns.get(edge).copied()).collect();
        used.sort_unstable();
        used.dedup();
        let compact = |column: i64| used.binary_search(&column).map_or(0, |rank| rank as i64);

        let mut extent: Vec<Option<(i64, i64)>> = vec![None; topology.ids.len()];
        let mut vertical_lines = BTreeSet::new();
        for &(a, b) in &topology.corridors {
            let Some(&column) = columns.get(&(a, b)) else {
                continue;
            };
            let x = compact(column);
            vertical_lines.insert(Segment::vertical(x, st[a] as i64, st[b] as i64));
            for vertex in [a, b] {
                extent[vertex] = Some(match extent[vertex] {
                    Some((low, high)) => (low.min(x), high.max(x)),
                    None => (x, x),
                });
            }
        }

        let mut vertex_positions = BTreeMap::new();
        let mut horizontal_lines = BTreeSet::new();
        let mut maximum_x = 0;
        for (at, &id) in topology.ids.iter().enumerate() {
            let (low, high) = extent[at].unwrap_or((0, 0));
            let y = st[at] as i64;
            let z = self
                .graph
                .vertex(id)
                .and_then(|vertex| topology.floors.binary_search(&vertex.z).ok())
                .unwrap_or(0) as i64;
            vertex_positions.insert(id, DrawPos { x: low + (high - low) / 2, y, z });
            horizontal_lines.insert(Segment::horizontal(y, low, high));
            maximum_x = maximum_x.max(high);
        }

        GraphDrawing {
            vertex_positions,
            horizontal_lines,
            vertical_lines,
            maximum_x,
            maximum_y: topology.ids.len() as i64 - 1,
            maximum_z: topology.floors.len().saturating_sub(1) as i64,
            start_vertex: self.start,
            end_vertex: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::Directions;
    use crate::grid::STEP;

    fn assert_crossing_free(drawing: &GraphDrawing) {
        let mut lines: Vec<&Segment> = drawing.horizontal_lines.iter().collect();
        lines.extend(&drawing.vertical_lines);
        for (at, a) in lines.iter().enumerate() {
            for b in &lines[at + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        for bar in &drawing.horizontal_lines {
            for line in &drawing.vertical_lines {
                let crosses = line.y1 < bar.y1
                    && bar.y1 < line.y2
                    && bar.x1 <= line.x1
                    && line.x1 <= bar.x2;
                assert!(!crosses, "{line:?} passes through {bar:?}");
            }
        }
    }

    #[test]
    fn single_corridor_draws_one_line() {
        let mut graph = GridGraph::new();
        let start = graph.add_grid_vertex(0, 0, 0);
        let end = graph.add_grid_vertex(STEP, 0, 0);
        graph.add_grid_edge(start, end, Directions::EAST, Directions::WEST);

        let drawing = GraphDrawer::new(&graph, start, end).draw().expect("planar");
        assert_eq!(drawing.position(start), Some(DrawPos { x: 0, y: 0, z: 0 }));
        assert_eq!(drawing.position(end), Some(DrawPos { x: 0, y: 1, z: 0 }));
        assert_eq!(drawing.vertical_lines.len(), 1);
        assert_eq!(drawing.maximum_x, 0);
        assert_eq!(drawing.maximum_y, 1);
    }

    #[test]
    fn square_with_a_tail_is_drawn_without_crossings() {
        let mut graph = GridGraph::new();
        let start = graph.add_grid_vertex(0, 0, 0);
        let east = graph.add_grid_vertex(10, 0, 0);
        let north_east = graph.add_grid_vertex(10, 10, 0);
        let north = graph.add_grid_vertex(0, 10, 0);
        let end = graph.add_grid_vertex(20, 0, 0);
        let tail = graph.add_grid_vertex(0, 20, 0);
        graph.add_grid_edge(start, east, Directions::EAST, Directions::WEST);
        graph.add_grid_edge(east, north_east, Directions::NORTH, Directions::SOUTH);
        graph.add_grid_edge(north_east, north, Directions::WEST, Directions::EAST);
        graph.add_grid_edge(north, start, Directions::SOUTH, Directions::NORTH);
        graph.add_grid_edge(east, end, Directions::EAST, Directions::WEST);
        graph.add_grid_edge(north, tail, Directions::NORTH, Directions::SOUTH);

        let drawing = GraphDrawer::new(&graph, start, end).draw().expect("planar");
        let rows: BTreeSet<i64> = drawing.vertex_positions.values().map(|pos| pos.y).collect();
        assert_eq!(rows, (0..6).collect());
        assert_eq!(drawing.position(start).map(|pos| pos.y), Some(0));
        assert_eq!(drawing.position(end).map(|pos| pos.y), Some(5));
        assert_eq!(drawing.vertical_lines.len(), 6);
        assert_crossing_free(&drawing);
    }

    #[test]
    fn floors_are_ranked() {
        let mut graph = GridGraph::new();
        let start = graph.add_grid_vertex(0, 0, 0);
        let landing = graph.add_grid_vertex(STEP, 0, 0);
        let upper = graph.add_grid_vertex(STEP, 0, 3 * STEP);
        graph.add_grid_edge(start, landing, Directions::EAST, Directions::WEST);
        graph.add_inter_floor_edge(landing, upper);

        let drawing = GraphDrawer::new(&graph, start, upper).draw().expect("planar");
        assert_eq!(drawing.position(upper).map(|pos| pos.z), Some(1));
        assert_eq!(drawing.maximum_z, 1);
    }

    #[test]
    fn missing_terminal_is_reported() {
        let mut other = GridGraph::new();
        let far_away =
            (0..4).map(|x| other.add_grid_vertex(x, 0, 0)).last().expect("four vertices");

        let mut graph = GridGraph::new();
        let start = graph.add_grid_vertex(0, 0, 0);
        let end = graph.add_grid_vertex(STEP, 0, 0);
        graph.add_grid_edge(start, end, Directions::EAST, Directions::WEST);
        assert_eq!(
            GraphDrawer::new(&graph, start, far_away).draw(),
            Err(DrawError::MissingTerminal)
        );
        assert_eq!(GraphDrawer::new(&GridGraph::new(), start, end).draw(), Err(DrawError::Empty));
    }
}
