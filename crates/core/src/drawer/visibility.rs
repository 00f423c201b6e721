//! Column assignment for a visibility drawing: faces are visited in a
//! topological order of the face-adjacency DAG, and the edges having a face
//! on their right receive consecutive columns when that face is reached.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::Graph;

use super::embedding::{Faces, Link, link};

/// Column of every edge in `links`. `st` must be a proper st-numbering of the
/// embedded graph and `outer` the face holding the dart `end -> start`.
pub(super) fn edge_columns(
    faces: &Faces,
    outer: usize,
    st: &[usize],
    links: &BTreeSet<Link>,
) -> BTreeMap<Link, i64> {
    let face_count = faces.boundaries.len();
    let source = face_count;
    let sink = face_count + 1;

    let mut dual = Graph::new();
    for _ in 0..face_count + 2 {
        dual.add_vertex(());
    }
    let mut rightward: Vec<Vec<(usize, usize)>> = vec![Vec::new(); face_count + 2];
    for &(a, b) in links {
        let (low, high) = if st[a] < st[b] { (a, b) } else { (b, a) };
        let right = faces.face_of.get(&(low, high)).copied().unwrap_or(outer);
        let left = faces.face_of.get(&(high, low)).copied().unwrap_or(outer);
        let right = if right == outer { sink } else { right };
        let left = if left == outer { source } else { left };
        dual.add_edge(left, right);
        rightward[right].push((low, high));
    }

    let tree = dual.depth_first_search(source);
    let mut order = tree.by_decreasing_exit();
    order.extend((0..face_count + 2).filter(|&face| !tree.visited(face)));

    let mut columns = BTreeMap::new();
    let mut next = 0_i64;
    for face in order {
        let edges = &mut rightward[face];
        edges.sort_by_key(|&(low, high)| (st[low], st[high]));
        for &(low, high) in edges.iter() {
            columns.insert(link(low, high), next);
            next += 1;
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawer::embedding::{embed, links, trace_faces};

    #[test]
    fn triangle_columns_follow_the_dual_order() {
        let order = vec![vec![1, 2], vec![0, 2], vec![1, 0]];
        let rotation = embed(&order, 0).expect("planar");
        let faces = trace_faces(&rotation);
        let outer = faces.face_of[&(2, 0)];
        let st = vec![0, 1, 2];
        let columns = edge_columns(&faces, outer, &st, &links(&rotation));

        assert_eq!(columns.len(), 3);
        let distinct: BTreeSet<_> = columns.values().collect();
        assert_eq!(distinct.len(), 3);
        // The chord 0 - 2 borders the outer face on one side and the inner
        // face on the other, so it lands at one of the two extremes.
        let chord = columns[&(0, 2)];
        assert!(chord == 0 || chord == 2);
        assert_eq!(columns[&(0, 1)].abs_diff(columns[&(1, 2)]), 1);
    }
}
