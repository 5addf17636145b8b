// =====================================================================
// File: rebalance.rs
//
// Description:
//   Rebalance-on-insert, rebalance-on-delete, and the rotation/split/
//   merge primitives they call. Every primitive here moves exactly the
//   keys/values/children required to stay balanced and refreshes
//   parent back-references on every node it touches.
// =====================================================================

use crate::node::{Node, NodeId};
use crate::tree::BTree;

impl BTree {
    /// The non-root underfull threshold, `⌈order/2⌉ - 1`. The single
    /// definition used everywhere a threshold is checked.
    pub(crate) fn min_keys(&self) -> usize {
        self.order().div_ceil(2) - 1
    }

    /// The index of `child` within `parent.children`, found by handle
    /// identity rather than by re-deriving it from key comparisons.
    pub(crate) fn child_index(&self, parent: NodeId, child: NodeId) -> usize {
        self.arena
            .node(parent)
            .children
            .iter()
            .position(|c| *c == Some(child))
            .expect("child not present in parent's children")
    }

    /// Points every live child of `id` back at `id`. Used after a
    /// split or merge mints a node whose children were moved in bulk.
    pub(crate) fn reparent_children(&mut self, id: NodeId) {
        let child_ids: Vec<NodeId> = self.arena.node(id).children.iter().flatten().copied().collect();
        for cid in child_ids {
            self.arena.node_mut(cid).parent = Some(id);
        }
    }

    // ---------------------------------------------------------------
    // Rebalance-on-insert
    // ---------------------------------------------------------------

    /// `node` has just become overfull (`k == order`, one past the
    /// cap). Rotates a key from a sibling if one has room, otherwise
    /// splits `node`.
    pub(crate) fn restructure_insert(&mut self, node: NodeId) {
        let Some(parent) = self.arena.node(node).parent else {
            self.split_insert(node);
            return;
        };
        let s = self.child_index(parent, node);
        let m = self.order();

        let left_ok = s > 0 && {
            let left = self.arena.node(parent).children[s - 1].expect("sibling slot empty");
            self.arena.node(left).k() < m - 1
        };
        let right_ok = !left_ok && {
            let num_children = self.arena.node(parent).children.len();
            s + 1 < num_children && {
                let right = self.arena.node(parent).children[s + 1].expect("sibling slot empty");
                self.arena.node(right).k() < m - 1
            }
        };

        if left_ok {
            let left = self.arena.node(parent).children[s - 1].expect("sibling slot empty");
            let target = (self.arena.node(node).k() + self.arena.node(left).k()).div_ceil(2);
            while self.arena.node(node).k() > target {
                self.rotate_left_insert(parent, s);
            }
        } else if right_ok {
            let right = self.arena.node(parent).children[s + 1].expect("sibling slot empty");
            let target = (self.arena.node(node).k() + self.arena.node(right).k()).div_ceil(2);
            while self.arena.node(node).k() > target {
                self.rotate_right_insert(parent, s);
            }
        } else {
            self.split_insert(node);
        }
    }

    /// One left rotation: `node`'s first key/value moves up to
    /// `parent.keys[s-1]`, the old value there demotes to the left
    /// sibling's tail, and `node`'s first child migrates with it.
    fn rotate_left_insert(&mut self, parent: NodeId, s: usize) {
        let child = self.arena.node(parent).children[s].expect("sibling slot empty");
        let left = self.arena.node(parent).children[s - 1].expect("sibling slot empty");

        let (promoted_key, promoted_val, moved_child) = {
            let c = self.arena.node_mut(child);
            (c.keys.remove(0), c.values.remove(0), c.children.remove(0))
        };
        let (demoted_key, demoted_val) = {
            let p = self.arena.node_mut(parent);
            (
                std::mem::replace(&mut p.keys[s - 1], promoted_key),
                std::mem::replace(&mut p.values[s - 1], promoted_val),
            )
        };
        {
            let l = self.arena.node_mut(left);
            l.keys.push(demoted_key);
            l.values.push(demoted_val);
            l.children.push(moved_child);
        }
        if let Some(mc) = moved_child {
            self.arena.node_mut(mc).parent = Some(left);
        }
    }

    /// The mirror of [`Self::rotate_left_insert`]: `node`'s last
    /// key/value moves up to `parent.keys[s]`, the old value there
    /// demotes to the right sibling's head, and `node`'s last child
    /// migrates to the right sibling's front.
    fn rotate_right_insert(&mut self, parent: NodeId, s: usize) {
        let child = self.arena.node(parent).children[s].expect("sibling slot empty");
        let right = self.arena.node(parent).children[s + 1].expect("sibling slot empty");

        let (promoted_key, promoted_val, moved_child) = {
            let c = self.arena.node_mut(child);
            (
                c.keys.pop().expect("rotating from an empty node"),
                c.values.pop().expect("rotating from an empty node"),
                c.children.pop().expect("rotating from an empty node"),
            )
        };
        let (demoted_key, demoted_val) = {
            let p = self.arena.node_mut(parent);
            (
                std::mem::replace(&mut p.keys[s], promoted_key),
                std::mem::replace(&mut p.values[s], promoted_val),
            )
        };
        {
            let r = self.arena.node_mut(right);
            r.keys.insert(0, demoted_key);
            r.values.insert(0, demoted_val);
            r.children.insert(0, moved_child);
        }
        if let Some(mc) = moved_child {
            self.arena.node_mut(mc).parent = Some(right);
        }
    }

    /// Splits an overfull `node` into two new siblings plus a promoted
    /// median, biasing the median toward the lower half on even-sized
    /// splits. If `node` was the root, mints a new root holding just
    /// the median; otherwise inserts the median into the parent and
    /// replaces `node` with the two new nodes at its old slot.
    fn split_insert(&mut self, node: NodeId) {
        let k = self.arena.node(node).k();
        let m_idx = if k % 2 == 0 { k / 2 - 1 } else { (k - 1) / 2 };
        let parent = self.arena.node(node).parent;
        let s = parent.map(|p| self.child_index(p, node));

        let old = self.arena.free(node);
        let Node { mut keys, mut values, mut children, .. } = old;

        let right_keys = keys.split_off(m_idx + 1);
        let right_values = values.split_off(m_idx + 1);
        let median_key = keys.pop().expect("split target has no median");
        let median_val = values.pop().expect("split target has no median");

        let is_leaf = children.iter().all(Option::is_none);
        let (left_children, right_children) = if is_leaf {
            (vec![None; keys.len() + 1], vec![None; right_keys.len() + 1])
        } else {
            let right_children = children.split_off(m_idx + 1);
            (children, right_children)
        };

        let left_id = self.arena.alloc(Node {
            keys,
            values,
            children: left_children,
            parent: None,
        });
        let right_id = self.arena.alloc(Node {
            keys: right_keys,
            values: right_values,
            children: right_children,
            parent: None,
        });
        self.reparent_children(left_id);
        self.reparent_children(right_id);

        match parent {
            None => {
                let root = Node {
                    keys: vec![median_key],
                    values: vec![median_val],
                    children: vec![Some(left_id), Some(right_id)],
                    parent: None,
                };
                let root_id = self.arena.alloc(root);
                self.arena.node_mut(left_id).parent = Some(root_id);
                self.arena.node_mut(right_id).parent = Some(root_id);
                self.root = Some(root_id);
            }
            Some(p) => {
                self.arena.node_mut(left_id).parent = Some(p);
                self.arena.node_mut(right_id).parent = Some(p);
                let idx = s.expect("non-root split always has a parent index");
                let pn = self.arena.node_mut(p);
                pn.keys.insert(idx, median_key);
                pn.values.insert(idx, median_val);
                pn.children.remove(idx);
                pn.children.insert(idx, Some(left_id));
                pn.children.insert(idx + 1, Some(right_id));
            }
        }
    }

    // ---------------------------------------------------------------
    // Rebalance-on-delete
    // ---------------------------------------------------------------

    /// Checks whether `parent`'s child at `child_idx` fell below the
    /// non-root underfull threshold after the recursive call into it,
    /// and restructures it if so.
    pub(crate) fn rebalance_after_delete(&mut self, parent: NodeId, child_idx: usize) {
        let child = self.arena.node(parent).children[child_idx].expect("sibling slot empty");
        if self.arena.node(child).k() < self.min_keys() {
            self.restructure_delete(child);
        }
    }

    /// `child` has fallen below the underfull threshold. Borrows from
    /// the right sibling if it can spare a key, else the left sibling,
    /// else merges `child` with an adjacent sibling (left if one
    /// exists, else right).
    fn restructure_delete(&mut self, child: NodeId) {
        let parent = self.arena.node(child).parent.expect("underfull child has no parent");
        let s = self.child_index(parent, child);
        let min = self.min_keys();
        let num_children = self.arena.node(parent).children.len();

        let right_ok = s + 1 < num_children && {
            let right = self.arena.node(parent).children[s + 1].expect("sibling slot empty");
            self.arena.node(right).k() > min
        };
        let left_ok = !right_ok
            && s > 0
            && {
                let left = self.arena.node(parent).children[s - 1].expect("sibling slot empty");
                self.arena.node(left).k() > min
            };

        if right_ok {
            let right = self.arena.node(parent).children[s + 1].expect("sibling slot empty");
            let target = (self.arena.node(child).k() + self.arena.node(right).k()) / 2;
            while self.arena.node(child).k() < target {
                self.borrow_from_right(parent, s);
            }
        } else if left_ok {
            let left = self.arena.node(parent).children[s - 1].expect("sibling slot empty");
            let target = (self.arena.node(child).k() + self.arena.node(left).k()) / 2;
            while self.arena.node(child).k() < target {
                self.borrow_from_left(parent, s);
            }
        } else {
            self.merge_children(parent, s);
        }
    }

    /// One borrow from the right sibling: `parent.keys[s]` demotes
    /// into `child`'s tail, the right sibling's first key/value
    /// promotes into `parent.keys[s]`, and the right sibling's first
    /// child migrates to `child`'s tail.
    fn borrow_from_right(&mut self, parent: NodeId, s: usize) {
        let child = self.arena.node(parent).children[s].expect("sibling slot empty");
        let right = self.arena.node(parent).children[s + 1].expect("sibling slot empty");

        let (sep_key, sep_val) = {
            let p = self.arena.node(parent);
            (p.keys[s], p.values[s].clone())
        };
        {
            let c = self.arena.node_mut(child);
            c.keys.push(sep_key);
            c.values.push(sep_val);
        }

        let (new_key, new_val, moved_child) = {
            let r = self.arena.node_mut(right);
            (r.keys.remove(0), r.values.remove(0), r.children.remove(0))
        };
        {
            let p = self.arena.node_mut(parent);
            p.keys[s] = new_key;
            p.values[s] = new_val;
        }
        self.arena.node_mut(child).children.push(moved_child);
        if let Some(mc) = moved_child {
            self.arena.node_mut(mc).parent = Some(child);
        }
    }

    /// The mirror of [`Self::borrow_from_right`], donating from the
    /// left sibling into `child`'s head instead.
    fn borrow_from_left(&mut self, parent: NodeId, s: usize) {
        let child = self.arena.node(parent).children[s].expect("sibling slot empty");
        let left = self.arena.node(parent).children[s - 1].expect("sibling slot empty");

        let (sep_key, sep_val) = {
            let p = self.arena.node(parent);
            (p.keys[s - 1], p.values[s - 1].clone())
        };
        {
            let c = self.arena.node_mut(child);
            c.keys.insert(0, sep_key);
            c.values.insert(0, sep_val);
        }

        let (new_key, new_val, moved_child) = {
            let l = self.arena.node_mut(left);
            (
                l.keys.pop().expect("borrowing from an empty sibling"),
                l.values.pop().expect("borrowing from an empty sibling"),
                l.children.pop().expect("borrowing from an empty sibling"),
            )
        };
        {
            let p = self.arena.node_mut(parent);
            p.keys[s - 1] = new_key;
            p.values[s - 1] = new_val;
        }
        self.arena.node_mut(child).children.insert(0, moved_child);
        if let Some(mc) = moved_child {
            self.arena.node_mut(mc).parent = Some(child);
        }
    }

    /// Merges `parent`'s children at `s - 1, s` (preferring the left
    /// sibling) or `s, s + 1` into one new node, pulling the separator
    /// key down from `parent`. If that leaves `parent` as an empty
    /// root, the caller's post-delete shrink check replaces it with
    /// the merged node.
    fn merge_children(&mut self, parent: NodeId, s: usize) {
        let (left_idx, right_idx) = if s > 0 { (s - 1, s) } else { (s, s + 1) };
        let left_id = self.arena.node(parent).children[left_idx].expect("sibling slot empty");
        let right_id = self.arena.node(parent).children[right_idx].expect("sibling slot empty");

        let sep_key = self.arena.node(parent).keys[left_idx];
        let sep_val = self.arena.node(parent).values[left_idx].clone();

        let left = self.arena.free(left_id);
        let right = self.arena.free(right_id);

        let mut keys = left.keys;
        keys.push(sep_key);
        keys.extend(right.keys);
        let mut values = left.values;
        values.push(sep_val);
        values.extend(right.values);

        let is_leaf = left.children.iter().all(Option::is_none);
        let children = if is_leaf {
            vec![None; keys.len() + 1]
        } else {
            let mut c = left.children;
            c.extend(right.children);
            c
        };

        let merged_id = self.arena.alloc(Node {
            keys,
            values,
            children,
            parent: Some(parent),
        });
        self.reparent_children(merged_id);

        let pn = self.arena.node_mut(parent);
        pn.keys.remove(left_idx);
        pn.values.remove(left_idx);
        pn.children.remove(right_idx);
        pn.children.remove(left_idx);
        pn.children.insert(left_idx, Some(merged_id));
    }
}
