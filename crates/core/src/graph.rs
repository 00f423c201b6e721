//! Generic adjacency graph with iterative depth-first search and st-numbering.
//! Vertices live in stable `usize` slots; removing a vertex frees its slot
//! without renumbering the others.

use std::cmp::Reverse;

use crate::error::GraphError;

const NIL: usize = usize::MAX;

#[derive(Clone, Debug)]
pub struct Graph<V = ()> {
    payloads: Vec<Option<V>>,
    adjacency: Vec<Vec<usize>>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self { payloads: Vec::new(), adjacency: Vec::new() }
    }
}

/// Result of one depth-first traversal. Per-vertex tables are indexed by slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfsTree {
    pub root: usize,
    pub preorder: Vec<usize>,
    pub parent: Vec<Option<usize>>,
    pub enter: Vec<Option<usize>>,
    pub exit: Vec<Option<usize>>,
    /// Vertex with the smallest enter time reachable through tree descendants
    /// plus one non-tree edge. The parent edge never counts.
    pub low: Vec<usize>,
}

impl DfsTree {
    pub fn visited(&self, vertex: usize) -> bool {
        self.enter.get(vertex).is_some_and(Option::is_some)
    }

    /// Visited vertices sorted by decreasing exit time.
    pub fn by_decreasing_exit(&self) -> Vec<usize> {
        let mut order = self.preorder.clone();
        order.sort_by_key(|&vertex| Reverse(self.exit[vertex]));
        order
    }
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, payload: V) -> usize {
        self.payloads.push(Some(payload));
        self.adjacency.push(Vec::new());
        self.payloads.len() - 1
    }

    pub fn remove_vertex(&mut self, vertex: usize) -> Option<V> {
        let payload = self.payloads.get_mut(vertex)?.take()?;
        self.adjacency[vertex].clear();
        for neighbors in &mut self.adjacency {
            neighbors.retain(|&other| other != vertex);
        }
        Some(payload)
    }

    pub fn contains_vertex(&self, vertex: usize) -> bool {
        self.payloads.get(vertex).is_some_and(Option::is_some)
    }

    pub fn payload(&self, vertex: usize) -> Option<&V> {
        self.payloads.get(vertex)?.as_ref()
    }

    /// Adds the directed edge `from -> to`. Duplicates and self loops are refused.
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if from == to || !self.contains_vertex(from) || !self.contains_vertex(to) {
            return false;
        }
        if self.adjacency[from].contains(&to) {
            return false;
        }
        self.adjacency[from].push(to);
        true
    }

    pub fn remove_edge(&mut self, from: usize, to: usize) -> bool {
        let Some(neighbors) = self.adjacency.get_mut(from) else {
            return false;
        };
        let before = neighbors.len();
        neighbors.retain(|&other| other != to);
        neighbors.len() != before
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.adjacency.get(from).is_some_and(|neighbors| neighbors.contains(&to))
    }

    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        self.adjacency.get(vertex).map_or(&[], Vec::as_slice)
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.payloads.iter().enumerate().filter(|(_, payload)| payload.is_some()).map(|(id, _)| id)
    }

    pub fn vertex_count(&self) -> usize {
        self.payloads.iter().filter(|payload| payload.is_some()).count()
    }

    pub fn slot_count(&self) -> usize {
        self.payloads.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Symmetric view over the same slots: every `a -> b` also yields `b -> a`.
    pub fn undirected(&self) -> Graph<()> {
        let mut view = Graph {
            payloads: self.payloads.iter().map(|payload| payload.as_ref().map(|_| ())).collect(),
            adjacency: self.adjacency.clone(),
        };
        for (from, neighbors) in self.adjacency.iter().enumerate() {
            for &to in neighbors {
                if !view.adjacency[to].contains(&from) {
                    view.adjacency[to].push(from);
                }
            }
        }
        view
    }

    pub fn depth_first_search(&self, root: usize) -> DfsTree {
        let slots = self.slot_count();
        let mut tree = DfsTree {
            root,
            preorder: Vec::new(),
            parent: vec![None; slots],
            enter: vec![None; slots],
            exit: vec![None; slots],
            low: (0..slots).collect(),
        };
        if !self.contains_vertex(root) {
            return tree;
        }

        let mut time = 0_usize;
        tree.enter[root] = Some(time);
        time += 1;
        tree.preorder.push(root);
        let mut stack = vec![(root, 0_usize)];

        while let Some(&(vertex, cursor)) = stack.last() {
            if let Some(&next) = self.adjacency[vertex].get(cursor) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if tree.enter[next].is_none() {
                    tree.parent[next] = Some(vertex);
                    tree.enter[next] = Some(time);
                    time += 1;
                    tree.preorder.push(next);
                    stack.push((next, 0));
                } else if tree.parent[vertex] != Some(next)
                    && tree.enter[next] < tree.enter[tree.low[vertex]]
                {
                    tree.low[vertex] = next;
                }
                continue;
            }

            stack.pop();
            tree.exit[vertex] = Some(time);
            time += 1;
            if let Some(parent) = tree.parent[vertex]
                && tree.enter[tree.low[vertex]] < tree.enter[tree.low[parent]]
            {
                tree.low[parent] = tree.low[vertex];
            }
        }

        tree
    }

    /// Bipolar numbering of the undirected view with `source` first and `sink`
    /// last. The edge `(source, sink)` must exist; the numbering is only a
    /// proper st-numbering when the graph is biconnected.
    pub fn st_numbering(
        &self,
        source: usize,
        sink: usize,
    ) -> Result<Vec<Option<usize>>, GraphError> {
        for vertex in [source, sink] {
            if !self.contains_vertex(vertex) {
                return Err(GraphError::MissingVertex(vertex));
            }
        }
        if source == sink {
            return Err(GraphError::SameEndpoints);
        }
        let mut view = self.undirected();
        let Some(position) = view.adjacency[source].iter().position(|&other| other == sink) else {
            return Err(GraphError::MissingEdge(source, sink));
        };
        view.adjacency[source].remove(position);
        view.adjacency[source].insert(0, sink);

        let tree = view.depth_first_search(source);
        if tree.preorder.len() != view.vertex_count() {
            return Err(GraphError::Disconnected);
        }

        let slots = view.slot_count();
        let mut next = vec![NIL; slots];
        let mut prev = vec![NIL; slots];
        let mut plus = vec![false; slots];
        let mut head = source;
        next[source] = sink;
        prev[sink] = source;

        for &vertex in &tree.preorder {
            if vertex == source || vertex == sink {
                continue;
            }
            let Some(parent) = tree.parent[vertex] else {
                continue;
            };
            if plus[tree.low[vertex]] {
                let after = next[parent];
                prev[vertex] = parent;
                next[vertex] = after;
                next[parent] = vertex;
                if after != NIL {
                    prev[after] = vertex;
                }
                plus[parent] = false;
            } else {
                let before = prev[parent];
                prev[vertex] = before;
                next[vertex] = parent;
                prev[parent] = vertex;
                if before == NIL {
                    head = vertex;
                } else {
                    next[before] = vertex;
                }
                plus[parent] = true;
            }
        }

        let mut numbering = vec![None; slots];
        let mut cursor = head;
        let mut rank = 0_usize;
        while cursor != NIL {
            numbering[cursor] = Some(rank);
            rank += 1;
            cursor = next[cursor];
        }
        Ok(numbering)
    }
}
