//! An in-memory B-tree of order `m`, mapping `i64` keys to `String`
//! values.
//!
//! The tree is a balanced multi-way search tree: every node holds at
//! most `m - 1` keys, and every non-root node holds at least
//! `⌈m/2⌉ - 1`. Rebalancing after insert or delete prefers rotating a
//! key in from a sibling over splitting or merging, matching the
//! classic B-tree trade-off of keeping nodes as full as the invariants
//! allow.
//!
//! ```
//! use btree::BTree;
//!
//! let mut tree = BTree::new(4).unwrap();
//! tree.insert(10, "a".to_string());
//! tree.insert(20, "b".to_string());
//! tree.insert(5, "c".to_string());
//!
//! assert_eq!(tree.search(20).unwrap(), "[\"b\"]");
//! tree.delete(20).unwrap();
//! assert!(tree.search(20).is_err());
//! ```

mod error;
mod json;
mod node;
mod rebalance;
mod tree;


pub use error::BTreeError;
pub use tree::BTree;
