// =====================================================================
// File: tree.rs
//
// Description:
//   The tree itself: owns the arena and the root handle, and exposes
//   insert/delete/search/dump plus the inorder-successor probe. The
//   recursive descent bodies live here; the rebalancing machinery they
//   call into lives in rebalance.rs.
// =====================================================================

use crate::error::BTreeError;
use crate::json::{render_path, Json, PathStep};
use crate::node::{Arena, Node, NodeId};

/// An in-memory B-tree of order `m`, mapping `i64` keys to `String`
/// values.
///
/// `order` bounds every node to at most `order - 1` keys; non-root
/// nodes hold at least `⌈order/2⌉ - 1`. The tree starts empty, with no
/// root, and grows or shrinks in height only at the root (a split of
/// the root mints a new root; a merge that empties the root promotes
/// its sole child).
pub struct BTree {
    order: usize,
    pub(crate) root: Option<NodeId>,
    pub(crate) arena: Arena,
}

impl BTree {
    /// Creates an empty tree of the given order. `order` must be at
    /// least 3 — the minimum order for a non-degenerate B-tree.
    pub fn new(order: usize) -> Result<Self, BTreeError> {
        if order < 3 {
            return Err(BTreeError::InvalidOrder(order));
        }
        Ok(BTree {
            order,
            root: None,
            arena: Arena::new(),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts `key` with `value`, growing the tree at an empty leaf
    /// and cascading splits/rotations upward if that leaf (or any of
    /// its ancestors) becomes overfull. Duplicate keys are
    /// unsupported: inserting an already-present key still descends
    /// and inserts a second entry rather than overwriting.
    pub fn insert(&mut self, key: i64, value: String) {
        let Some(root) = self.root else {
            self.root = Some(self.arena.alloc(Node::leaf_with(key, value)));
            return;
        };
        self.insert_recursive(root, key, value);
    }

    pub(crate) fn insert_recursive(&mut self, node: NodeId, key: i64, value: String) {
        let (i, is_leaf) = {
            let n = self.arena.node(node);
            (n.probe(key), n.is_leaf())
        };

        if is_leaf {
            let n = self.arena.node_mut(node);
            n.keys.insert(i, key);
            n.values.insert(i, value);
            let k = n.keys.len();
            n.children = vec![None; k + 1];
            if k > self.order - 1 {
                self.restructure_insert(node);
            }
        } else {
            let child = self.arena.node(node).children[i].expect("internal node missing child");
            self.insert_recursive(child, key, value);
            if self.arena.node(node).k() > self.order - 1 {
                self.restructure_insert(node);
            }
        }
    }

    /// Removes `key`. Fails with [`BTreeError::EmptyTree`] on an empty
    /// tree and [`BTreeError::KeyNotFound`] if descent bottoms out
    /// without locating `key`; on success every structural invariant
    /// holds again before returning.
    pub fn delete(&mut self, key: i64) -> Result<(), BTreeError> {
        let root = self.root.ok_or(BTreeError::EmptyTree)?;
        self.delete_recursive(root, key)?;
        self.shrink_root_if_needed();
        Ok(())
    }

    fn delete_recursive(&mut self, node: NodeId, key: i64) -> Result<(), BTreeError> {
        let (i, found, is_leaf) = {
            let n = self.arena.node(node);
            let i = n.probe(key);
            (i, i < n.k() && n.keys[i] == key, n.is_leaf())
        };

        if found {
            if is_leaf {
                let n = self.arena.node_mut(node);
                n.keys.remove(i);
                n.values.remove(i);
                let k = n.keys.len();
                n.children = vec![None; k + 1];
            } else {
                let right_child = self.arena.node(node).children[i + 1].expect("internal node missing child");
                let (succ_key, succ_val) = self.inorder_successor_of(right_child);
                {
                    let n = self.arena.node_mut(node);
                    n.keys[i] = succ_key;
                    n.values[i] = succ_val;
                }
                self.delete_recursive(right_child, succ_key)?;
                self.rebalance_after_delete(node, i + 1);
            }
        } else {
            if is_leaf {
                return Err(BTreeError::KeyNotFound);
            }
            let child = self.arena.node(node).children[i].expect("internal node missing child");
            self.delete_recursive(child, key)?;
            self.rebalance_after_delete(node, i);
        }
        Ok(())
    }

    /// If the root lost its last key (either directly, or via a merge
    /// at the top level), shrinks the tree by one level: an internal
    /// root with zero keys is replaced by its sole child, and a leaf
    /// root with zero keys leaves the tree empty.
    fn shrink_root_if_needed(&mut self) {
        let Some(root) = self.root else { return };
        let (is_leaf, empty) = {
            let n = self.arena.node(root);
            (n.is_leaf(), n.keys.is_empty())
        };
        if !empty {
            return;
        }
        if is_leaf {
            self.arena.free(root);
            self.root = None;
        } else {
            let only_child = self.arena.node(root).children[0].expect("empty internal root has no child");
            self.arena.node_mut(only_child).parent = None;
            self.arena.free(root);
            self.root = Some(only_child);
        }
    }

    /// Returns the leftmost `(key, value)` pair of the whole tree,
    /// descending from the root to the leftmost leaf. `None` on an
    /// empty tree.
    pub fn inorder_successor(&self) -> Option<(i64, String)> {
        let root = self.root?;
        Some(self.inorder_successor_of(root))
    }

    pub(crate) fn inorder_successor_of(&self, node: NodeId) -> (i64, String) {
        let mut current = node;
        loop {
            let n = self.arena.node(current);
            if n.is_leaf() {
                return (n.keys[0], n.values[0].clone());
            }
            current = n.children[0].expect("internal node missing child");
        }
    }

    /// Locates `key` and renders the path as a JSON array: a prefix of
    /// child indices chosen at each interior level, then the located
    /// value as the final element. Fails with
    /// [`BTreeError::EmptyTree`] on an empty tree and
    /// [`BTreeError::KeyNotFound`] if descent bottoms out at a leaf
    /// without finding `key`.
    pub fn search(&self, key: i64) -> Result<String, BTreeError> {
        let root = self.root.ok_or(BTreeError::EmptyTree)?;
        let mut steps = Vec::new();
        self.search_recursive(root, key, &mut steps)?;
        Ok(render_path(&steps))
    }

    fn search_recursive(&self, node: NodeId, key: i64, out: &mut Vec<PathStep>) -> Result<(), BTreeError> {
        let n = self.arena.node(node);
        let i = n.probe(key);
        if i < n.k() && n.keys[i] == key {
            out.push(PathStep::Value(n.values[i].clone()));
            return Ok(());
        }
        if n.is_leaf() {
            return Err(BTreeError::KeyNotFound);
        }
        let child = n.children[i].expect("internal node missing child");
        out.push(PathStep::Child(i));
        self.search_recursive(child, key, out)
    }

    /// Renders the tree as a JSON object with `keys`, `values`, and
    /// `children` fields, recursively, two-space indented. An empty
    /// tree renders as `{}`.
    pub fn dump(&self) -> String {
        match self.root {
            None => "{}".to_string(),
            Some(root) => {
                let value = self.node_to_json(root);
                crate::json::pretty(&value, 0)
            }
        }
    }

    fn node_to_json(&self, id: NodeId) -> Json {
        let n = self.arena.node(id);
        Json::Object(vec![
            ("keys", Json::Array(n.keys.iter().map(|k| Json::Int(*k)).collect())),
            ("values", Json::Array(n.values.iter().map(|v| Json::Str(v.clone())).collect())),
            (
                "children",
                Json::Array(
                    n.children
                        .iter()
                        .map(|c| match c {
                            Some(cid) => self.node_to_json(*cid),
                            None => Json::Null,
                        })
                        .collect(),
                ),
            ),
        ])
    }

    /// In-order traversal of every key in the tree; used by tests to
    /// verify strict ascending order (invariant 1) without exposing
    /// internal structure as a public API.
    #[cfg(test)]
    pub(crate) fn inorder_keys(&self) -> Vec<i64> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_inorder(root, &mut out);
        }
        out
    }

    #[cfg(test)]
    fn collect_inorder(&self, node: NodeId, out: &mut Vec<i64>) {
        let n = self.arena.node(node);
        for i in 0..n.k() {
            if let Some(child) = n.children[i] {
                self.collect_inorder(child, out);
            }
            out.push(n.keys[i]);
        }
        if let Some(child) = n.children[n.k()] {
            self.collect_inorder(child, out);
        }
    }
}
