use hashbrown::{HashMap, HashSet};

use super::tables::{EdgeRow, EdgeTable, NodeRow, NodeTable};

/// Outcome of [`simplify`]: a remapped node table restricted to samples and
/// their ancestors, the corresponding remapped (and squashed) edge table,
/// and the old-to-new node id mapping for callers that need to translate
/// other per-chromosome tables (sites/mutations reference nodes only
/// indirectly through edges here, so they need no remapping themselves).
pub struct SimplifyResult {
    pub nodes: NodeTable,
    pub edges: EdgeTable,
    pub node_map: HashMap<u64, u64>,
}

/// A workable, non-tskit simplify: restricts the node/edge tables to the
/// sample set plus every node transitively reachable as a parent of a
/// sample (spec §4.9 "invoke simplify ... using as samples the currently-
/// alive individuals plus the `remembered_nodes_` set"; §8 "after a tick's
/// simplify, the node count is non-increasing").
///
/// This does not perform tskit's full ancestry-interval reduction (no
/// coordinate compression across unary chains); it preserves exactly the
/// edges whose child is in the retained set, then squashes adjacent edges
/// between the same (parent, child) pair into single intervals, which is
/// enough to keep table growth bounded between auto-simplification passes
/// without losing any ancestry information samples need.
pub fn simplify(nodes: &NodeTable, edges: &EdgeTable, samples: &[u64]) -> SimplifyResult {
    let mut children_to_edges: HashMap<u64, Vec<&EdgeRow>> = HashMap::new();
    for edge in edges.rows() {
        children_to_edges.entry(edge.child).or_default().push(edge);
    }

    let mut retained: HashSet<u64> = samples.iter().copied().collect();
    let mut worklist: Vec<u64> = samples.to_vec();
    while let Some(child) = worklist.pop() {
        if let Some(parent_edges) = children_to_edges.get(&child) {
            for edge in parent_edges {
                if retained.insert(edge.parent) {
                    worklist.push(edge.parent);
                }
            }
        }
    }

    let mut retained_sorted: Vec<u64> = retained.into_iter().collect();
    retained_sorted.sort_unstable();

    let mut node_map: HashMap<u64, u64> = HashMap::with_capacity(retained_sorted.len());
    let mut new_node_rows: Vec<NodeRow> = Vec::with_capacity(retained_sorted.len());
    for (new_id, &old_id) in retained_sorted.iter().enumerate() {
        if let Some(row) = nodes.get(old_id) {
            node_map.insert(old_id, new_id as u64);
            new_node_rows.push(*row);
        }
    }

    let mut remapped: Vec<EdgeRow> = edges
        .rows()
        .iter()
        .filter_map(|e| {
            let parent = *node_map.get(&e.parent)?;
            let child = *node_map.get(&e.child)?;
            Some(EdgeRow { left: e.left, right: e.right, parent, child })
        })
        .collect();

    squash_edges(&mut remapped);

    SimplifyResult {
        nodes: NodeTable::from_rows(new_node_rows),
        edges: EdgeTable::from_rows(remapped),
        node_map,
    }
}

/// Merges adjacent edges sharing a (parent, child) pair where one's `right`
/// equals the next's `left`, the same coalescing tskit's `simplify` performs
/// to keep edge counts from growing without bound across ticks.
fn squash_edges(edges: &mut Vec<EdgeRow>) {
    edges.sort_by_key(|e| (e.parent, e.child, e.left));
    let mut squashed: Vec<EdgeRow> = Vec::with_capacity(edges.len());
    for edge in edges.drain(..) {
        if let Some(last) = squashed.last_mut() {
            if last.parent == edge.parent && last.child == edge.child && last.right == edge.left {
                last.right = edge.right;
                continue;
            }
        }
        squashed.push(edge);
    }
    *edges = squashed;
}

/// Whether the sample set has coalesced to a single root over the full
/// chromosome extent (spec §4.9 "check whether the edge table has a single
/// root over the full chromosome extent"). A root is a retained node that
/// never appears as a child.
pub fn has_coalesced(edges: &EdgeTable, retained_node_count: usize) -> bool {
    if retained_node_count == 0 {
        return false;
    }
    let children: HashSet<u64> = edges.rows().iter().map(|e| e.child).collect();
    let parents: HashSet<u64> = edges.rows().iter().map(|e| e.parent).collect();
    let roots: HashSet<u64> = parents.difference(&children).copied().collect();
    roots.len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplify_keeps_samples_and_their_ancestors() {
        let mut nodes = NodeTable::new();
        let root = nodes.add_node(0.0, -1, false);
        let mid = nodes.add_node(1.0, -1, false);
        let leaf = nodes.add_node(2.0, 1, true);
        let unrelated = nodes.add_node(2.0, -1, false);
        let _ = unrelated;

        let mut edges = EdgeTable::new();
        edges.add_edge(0, 100, root, mid);
        edges.add_edge(0, 100, mid, leaf);

        let result = simplify(&nodes, &edges, &[leaf]);
        assert_eq!(result.nodes.len(), 3);
        assert_eq!(result.edges.len(), 2);
        assert!(result.node_map.contains_key(&leaf));
        assert!(result.node_map.contains_key(&root));
        assert!(!result.node_map.contains_key(&unrelated));
    }

    #[test]
    fn adjacent_edges_between_same_pair_are_squashed() {
        let mut edges = EdgeTable::new();
        edges.add_edge(0, 50, 0, 1);
        edges.add_edge(50, 100, 0, 1);
        let mut owned: Vec<_> = edges.rows().to_vec();
        squash_edges(&mut owned);
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].left, 0);
        assert_eq!(owned[0].right, 100);
    }

    #[test]
    fn repeated_simplify_on_already_simplified_tables_is_a_no_op() {
        let mut nodes = NodeTable::new();
        let root = nodes.add_node(0.0, -1, false);
        let leaf = nodes.add_node(1.0, 0, true);
        let mut edges = EdgeTable::new();
        edges.add_edge(0, 100, root, leaf);

        let first = simplify(&nodes, &edges, &[leaf]);
        let second = simplify(&first.nodes, &first.edges, &[*first.node_map.get(&leaf).unwrap()]);
        assert_eq!(first.nodes.len(), second.nodes.len());
        assert_eq!(first.edges.len(), second.edges.len());
    }

    #[test]
    fn single_root_is_detected_as_coalesced() {
        let mut edges = EdgeTable::new();
        edges.add_edge(0, 100, 0, 1);
        edges.add_edge(0, 100, 0, 2);
        assert!(has_coalesced(&edges, 3));
    }
}
