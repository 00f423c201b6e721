//! Combinatorial planar embedding: block decomposition, face insertion inside
//! each block, and augmentation of the rotation system until it is
//! biconnected.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::mem;

use crate::error::DrawError;
use crate::graph::Graph;

/// Undirected edge, smaller endpoint first.
pub(super) type Link = (usize, usize);

/// Cyclic order of the neighbours around every vertex.
pub(super) type Rotation = Vec<Vec<usize>>;

pub(super) fn link(a: usize, b: usize) -> Link {
    (a.min(b), a.max(b))
}

pub(super) fn links(adjacency: &[Vec<usize>]) -> BTreeSet<Link> {
    adjacency
        .iter()
        .enumerate()
        .flat_map(|(vertex, around)| around.iter().map(move |&other| link(vertex, other)))
        .collect()
}

pub(super) fn to_graph(adjacency: &[Vec<usize>]) -> Graph {
    let mut graph = Graph::new();
    for _ in adjacency {
        graph.add_vertex(());
    }
    for (vertex, around) in adjacency.iter().enumerate() {
        for &other in around {
            graph.add_edge(vertex, other);
        }
    }
    graph
}

/// Biconnected block of every edge reachable from `root`, from DFS
/// low-points. Bridges form single-edge blocks.
pub(super) fn blocks(graph: &Graph, root: usize) -> BTreeMap<Link, usize> {
    let tree = graph.depth_first_search(root);
    let mut block_of = BTreeMap::new();
    let mut count = 0_usize;

    for &vertex in &tree.preorder {
        let Some(parent) = tree.parent[vertex] else {
            continue;
        };
        let inherited = tree.parent[parent]
            .filter(|_| tree.enter[tree.low[vertex]] < tree.enter[parent])
            .and_then(|grandparent| block_of.get(&link(grandparent, parent)).copied());
        let block = inherited.unwrap_or_else(|| {
            count += 1;
            count - 1
        });
        block_of.insert(link(parent, vertex), block);
    }

    for &vertex in &tree.preorder {
        let Some(parent) = tree.parent[vertex] else {
            continue;
        };
        let Some(block) = block_of.get(&link(parent, vertex)).copied() else {
            continue;
        };
        for &other in graph.neighbors(vertex) {
            if other != parent && tree.enter[other] < tree.enter[vertex] {
                block_of.insert(link(vertex, other), block);
            }
        }
    }
    block_of
}

/// Planar rotation system of a connected graph. `order` fixes the neighbour
/// order used for tie-breaks; the result only depends on it and `root`.
pub(super) fn embed(order: &[Vec<usize>], root: usize) -> Result<Rotation, DrawError> {
    let mut members: BTreeMap<usize, BTreeSet<Link>> = BTreeMap::new();
    for (edge, block) in blocks(&to_graph(order), root) {
        members.entry(block).or_default().insert(edge);
    }

    let mut rotation = vec![Vec::new(); order.len()];
    for edges in members.values() {
        for (vertex, around) in embed_block(edges, order)? {
            rotation[vertex].extend(around);
        }
    }
    Ok(rotation)
}

/// Adds edges inside faces between consecutive neighbours of cut vertices
/// until no cut vertex is left. Returns the added edges.
///
/// Blocks are computed once. Each added edge merges the two blocks it joins,
/// which never opens a new gap, so a single sweep over the vertices is
/// enough.
pub(super) fn biconnect(rotation: &mut Rotation, root: usize) -> BTreeSet<Link> {
    let mut block_of = blocks(&to_graph(rotation), root);
    let mut merged: Vec<usize> = (0..block_of.len()).collect();
    let mut added = BTreeSet::new();

    for center in 0..rotation.len() {
        let degree = rotation[center].len();
        if degree < 2 {
            continue;
        }
        for at in 0..degree {
            let before = rotation[center][at];
            let after = rotation[center][(at + 1) % degree];
            let (Some(&first), Some(&second)) =
                (block_of.get(&link(center, before)), block_of.get(&link(center, after)))
            else {
                continue;
            };
            let (first, second) = (block_root(&mut merged, first), block_root(&mut merged, second));
            if first == second {
                continue;
            }
            merged[second] = first;
            block_of.insert(link(before, after), first);

            // New face `before -> center -> after -> before` splits off the old one.
            let at =
                rotation[after].iter().position(|&other| other == center).map_or(0, |at| at + 1);
            rotation[after].insert(at, before);
            let at = rotation[before].iter().position(|&other| other == center).unwrap_or(0);
            rotation[before].insert(at, after);
            added.insert(link(before, after));
        }
    }
    added
}

fn block_root(merged: &mut [usize], mut block: usize) -> usize {
    while merged[block] != block {
        merged[block] = merged[merged[block]];
        block = merged[block];
    }
    block
}

#[derive(Clone, Debug, Default)]
pub(super) struct Faces {
    pub boundaries: Vec<Vec<(usize, usize)>>,
    pub face_of: BTreeMap<(usize, usize), usize>,
}

/// Walks every dart with `next(u -> v) = (v -> successor of u around v)`.
pub(super) fn trace_faces(rotation: &Rotation) -> Faces {
    let mut faces = Faces::default();
    for (vertex, around) in rotation.iter().enumerate() {
        for &other in around {
            if faces.face_of.contains_key(&(vertex, other)) {
                continue;
            }
            let id = faces.boundaries.len();
            let mut boundary = Vec::new();
            let mut dart = (vertex, other);
            while !faces.face_of.contains_key(&dart) {
                faces.face_of.insert(dart, id);
                boundary.push(dart);
                let (from, to) = dart;
                let Some(next) = successor(rotation, to, from) else {
                    break;
                };
                dart = (to, next);
            }
            faces.boundaries.push(boundary);
        }
    }
    faces
}

fn successor(rotation: &Rotation, vertex: usize, neighbor: usize) -> Option<usize> {
    let around = rotation.get(vertex)?;
    let at = around.iter().position(|&other| other == neighbor)?;
    around.get((at + 1) % around.len()).copied()
}

/// Bridge of the embedded subgraph: a chord between two embedded vertices,
/// or a component of the rest together with its attachments.
struct Fragment {
    attachments: Vec<usize>,
    inner: BTreeSet<usize>,
}

/// Embedded subgraph during face insertion. Faces are vertex cycles.
struct Partial {
    vertices: BTreeSet<usize>,
    edges: BTreeSet<Link>,
    faces: Vec<Vec<usize>>,
}

fn embed_block(
    edges: &BTreeSet<Link>,
    order: &[Vec<usize>],
) -> Result<BTreeMap<usize, Vec<usize>>, DrawError> {
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default();
        adjacency.entry(b).or_default();
    }
    for (&vertex, around) in &mut adjacency {
        around.extend(
            order[vertex].iter().copied().filter(|&other| edges.contains(&link(vertex, other))),
        );
    }

    let Some(&(a, b)) = edges.first() else {
        return Ok(BTreeMap::new());
    };
    if edges.len() == 1 {
        return Ok(BTreeMap::from([(a, vec![b]), (b, vec![a])]));
    }

    let cycle = find_cycle(&adjacency, a, b).ok_or(DrawError::NonPlanar)?;
    let mut partial = Partial {
        vertices: cycle.iter().copied().collect(),
        edges: cycle
            .iter()
            .zip(cycle.iter().cycle().skip(1))
            .map(|(&x, &y)| link(x, y))
            .collect(),
        faces: vec![cycle.iter().rev().copied().collect(), cycle],
    };

    while partial.edges.len() < edges.len() {
        let fragments = partial.fragments(&adjacency, edges);
        let mut admissible = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            let faces = partial.admissible_faces(fragment);
            if faces.is_empty() {
                return Err(DrawError::NonPlanar);
            }
            admissible.push(faces);
        }
        let chosen = admissible.iter().position(|faces| faces.len() == 1).unwrap_or(0);
        let path = partial.path(&fragments[chosen], &adjacency).ok_or(DrawError::NonPlanar)?;
        partial.insert_path(admissible[chosen][0], &path)?;
    }

    rotation_from_faces(&partial.faces, &adjacency)
}

/// Cycle through the edge `a - b`, listed from `b` round to `a`.
fn find_cycle(
    adjacency: &BTreeMap<usize, Vec<usize>>,
    a: usize,
    b: usize,
) -> Option<Vec<usize>> {
    let mut parent = BTreeMap::from([(b, b)]);
    let mut queue = VecDeque::from([b]);
    while let Some(vertex) = queue.pop_front() {
        if vertex == a {
            let mut cycle = vec![a];
            let mut cursor = a;
            while cursor != b {
                cursor = parent[&cursor];
                cycle.push(cursor);
            }
            cycle.reverse();
            return Some(cycle);
        }
        for &next in &adjacency[&vertex] {
            if link(vertex, next) == link(a, b) || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, vertex);
            queue.push_back(next);
        }
    }
    None
}

impl Partial {
    fn fragments(
        &self,
        adjacency: &BTreeMap<usize, Vec<usize>>,
        edges: &BTreeSet<Link>,
    ) -> Vec<Fragment> {
        let mut fragments: Vec<Fragment> = edges
            .iter()
            .filter(|&&(x, y)| {
                !self.edges.contains(&(x, y))
                    && self.vertices.contains(&x)
                    && self.vertices.contains(&y)
            })
            .map(|&(x, y)| Fragment { attachments: vec![x, y], inner: BTreeSet::new() })
            .collect();

        let mut seen = BTreeSet::new();
        for &start in adjacency.keys() {
            if self.vertices.contains(&start) || !seen.insert(start) {
                continue;
            }
            let mut inner = BTreeSet::from([start]);
            let mut attachments = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            while let Some(vertex) = queue.pop_front() {
                for &next in &adjacency[&vertex] {
                    if self.vertices.contains(&next) {
                        attachments.insert(next);
                    } else if seen.insert(next) {
                        inner.insert(next);
                        queue.push_back(next);
                    }
                }
            }
            fragments.push(Fragment { attachments: attachments.into_iter().collect(), inner });
        }
        fragments
    }

    fn admissible_faces(&self, fragment: &Fragment) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| fragment.attachments.iter().all(|vertex| face.contains(vertex)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Path through the fragment between two distinct attachments.
    fn path(
        &self,
        fragment: &Fragment,
        adjacency: &BTreeMap<usize, Vec<usize>>,
    ) -> Option<Vec<usize>> {
        let from = *fragment.attachments.first()?;
        if fragment.inner.is_empty() {
            return Some(fragment.attachments.clone());
        }

        let mut parent = BTreeMap::new();
        let mut queue = VecDeque::new();
        for &next in &adjacency[&from] {
            if fragment.inner.contains(&next) && !parent.contains_key(&next) {
                parent.insert(next, from);
                queue.push_back(next);
            }
        }
        while let Some(vertex) = queue.pop_front() {
            for &next in &adjacency[&vertex] {
                if fragment.inner.contains(&next) {
                    if !parent.contains_key(&next) {
                        parent.insert(next, vertex);
                        queue.push_back(next);
                    }
                } else if next != from {
                    let mut path = vec![next, vertex];
                    let mut cursor = vertex;
                    while let Some(&up) = parent.get(&cursor) {
                        path.push(up);
                        if up == from {
                            break;
                        }
                        cursor = up;
                    }
                    path.reverse();
                    return Some(path);
                }
            }
        }
        None
    }

    /// Splits `face` along `path`, whose ends already lie on it.
    fn insert_path(&mut self, face: usize, path: &[usize]) -> Result<(), DrawError> {
        let (Some(&a), Some(&b)) = (path.first(), path.last()) else {
            return Err(DrawError::NonPlanar);
        };
        let boundary = mem::take(&mut self.faces[face]);
        let at_a = boundary.iter().position(|&vertex| vertex == a);
        let at_b = boundary.iter().position(|&vertex| vertex == b);
        let (Some(at_a), Some(at_b)) = (at_a, at_b) else {
            return Err(DrawError::NonPlanar);
        };
        let interior = &path[1..path.len() - 1];

        let mut first = walk(&boundary, at_a, at_b);
        first.extend(interior.iter().rev());
        let mut second = walk(&boundary, at_b, at_a);
        second.extend(interior);
        self.faces[face] = first;
        self.faces.push(second);

        self.vertices.extend(path);
        self.edges.extend(path.windows(2).map(|pair| link(pair[0], pair[1])));
        Ok(())
    }
}

/// Vertices of a cyclic sequence from index `from` to `to`, both included.
fn walk(cycle: &[usize], from: usize, to: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut at = from;
    loop {
        out.push(cycle[at]);
        if at == to {
            return out;
        }
        at = (at + 1) % cycle.len();
    }
}

/// Consecutive `a, b, c` on a face means `c` follows `a` around `b`.
fn rotation_from_faces(
    faces: &[Vec<usize>],
    adjacency: &BTreeMap<usize, Vec<usize>>,
) -> Result<BTreeMap<usize, Vec<usize>>, DrawError> {
    let mut successor = BTreeMap::new();
    for face in faces {
        let len = face.len();
        for at in 0..len {
            successor.insert((face[(at + 1) % len], face[at]), face[(at + 2) % len]);
        }
    }

    let mut rotation = BTreeMap::new();
    for (&vertex, around) in adjacency {
        let Some(&first) = around.first() else {
            continue;
        };
        let mut order = vec![first];
        let mut cursor = first;
        while let Some(&next) = successor.get(&(vertex, cursor)) {
            if next == first {
                break;
            }
            order.push(next);
            if order.len() > around.len() {
                return Err(DrawError::NonPlanar);
            }
            cursor = next;
        }
        if order.len() != around.len() {
            return Err(DrawError::NonPlanar);
        }
        rotation.insert(vertex, order);
    }
    Ok(rotation)
}
