//! Self-referencing trees stored as flat rows.
//!
//! Rows carry a nullable parent id. Reads materialise them into a forest of
//! owned nodes (children hold no back-pointer), writes use the link helpers to
//! walk the hierarchy without recursion.

use std::collections::{HashMap, HashSet};

/// A flat row that points at its parent by id.
pub trait TreeRow {
    fn node_id(&self) -> i64;
    fn parent_id(&self) -> Option<i64>;
}

/// A nested node built from a [`TreeRow`].
pub trait TreeNode: Sized {
    type Row: TreeRow;

    fn from_row(row: Self::Row) -> Self;
    fn push_child(&mut self, child: Self);
}

/// Build a forest from flat rows.
///
/// Roots are rows without a parent. A row whose parent is not in `rows` is
/// dropped together with its subtree, it is never promoted to a root. Input
/// order is kept for roots and for siblings. Nodes below `max_depth` levels
/// (roots are level 1) are dropped as well, so the result can be serialized
/// and dropped recursively.
pub fn build_forest<N: TreeNode>(rows: Vec<N::Row>, max_depth: usize) -> Vec<N> {
    let index: HashMap<i64, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.node_id(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match row.parent_id() {
            None => roots.push(i),
            Some(parent) => {
                if let Some(&p) = index.get(&parent) {
                    children[p].push(i);
                }
            }
        }
    }

    let mut pending: Vec<Option<N::Row>> = rows.into_iter().map(Some).collect();
    let mut built: Vec<Option<N>> = (0..pending.len()).map(|_| None).collect();

    // Post-order walk: a node is assembled once all its children are built.
    let mut stack: Vec<(usize, usize, bool)> =
        roots.iter().rev().map(|&r| (r, 1, false)).collect();
    while let Some((i, depth, expanded)) = stack.pop() {
        if expanded {
            let Some(row) = pending[i].take() else {
                continue;
            };
            let mut node = N::from_row(row);
            for &c in &children[i] {
                if let Some(child) = built[c].take() {
                    node.push_child(child);
                }
            }
            built[i] = Some(node);
        } else if depth <= max_depth {
            stack.push((i, depth, true));
            for &c in children[i].iter().rev() {
                stack.push((c, depth + 1, false));
            }
        }
    }

    roots.into_iter().filter_map(|r| built[r].take()).collect()
}

/// Every transitive descendant of `root`, excluding `root` itself.
pub fn descendant_ids(links: &[(i64, Option<i64>)], root: i64) -> Vec<i64> {
    let mut by_parent: HashMap<i64, Vec<i64>> = HashMap::new();
    for &(id, parent) in links {
        if let Some(parent) = parent {
            by_parent.entry(parent).or_default().push(id);
        }
    }

    let mut seen = HashSet::from([root]);
    let mut found = Vec::new();
    let mut worklist = vec![root];
    while let Some(current) = worklist.pop() {
        if let Some(kids) = by_parent.get(&current) {
            for &kid in kids {
                if seen.insert(kid) {
                    found.push(kid);
                    worklist.push(kid);
                }
            }
        }
    }
    found
}

/// Levels from `node` up to its root, `node` included.
///
/// A missing ancestor ends the path. On looping links each node counts once.
pub fn depth_of(node: i64, parents: &HashMap<i64, Option<i64>>) -> usize {
    let mut visited = HashSet::new();
    let mut current = Some(node);
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        current = parents.get(&id).copied().flatten();
    }
    visited.len()
}

/// Levels in the subtree rooted at `root`, `root` counting as one.
pub fn subtree_height(parents: &HashMap<i64, Option<i64>>, root: i64) -> usize {
    let mut by_parent: HashMap<i64, Vec<i64>> = HashMap::new();
    for (&id, parent) in parents {
        if let Some(parent) = parent {
            by_parent.entry(*parent).or_default().push(id);
        }
    }

    let mut seen = HashSet::from([root]);
    let mut height = 1;
    let mut worklist = vec![(root, 1)];
    while let Some((current, level)) = worklist.pop() {
        height = height.max(level);
        for &kid in by_parent.get(&current).into_iter().flatten() {
            if seen.insert(kid) {
                worklist.push((kid, level + 1));
            }
        }
    }
    height
}

/// Would making `proposed_parent` the parent of `node` close a loop?
///
/// Ascends from `proposed_parent` through `parents` until a root or a missing
/// row (no cycle) or until `node` is reached (cycle). Revisiting an ancestor
/// means the stored links already loop; that is reported as a cycle too.
pub fn would_create_cycle(
    node: i64,
    proposed_parent: i64,
    parents: &HashMap<i64, Option<i64>>,
) -> bool {
    if node == proposed_parent {
        return true;
    }

    let mut visited = HashSet::new();
    let mut current = Some(proposed_parent);
    while let Some(id) = current {
        if id == node || !visited.insert(id) {
            return true;
        }
        current = parents.get(&id).copied().flatten();
    }
    false
}
