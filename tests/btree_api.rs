// =====================================================================
// File: btree_api.rs
//
// Description:
//   Black-box integration tests against the public API only, the way
//   a downstream consumer of the crate would exercise it: no access to
//   node/arena internals, just insert/delete/search/dump.
// =====================================================================
use btree::{BTree, BTreeError};

#[test]
fn fresh_tree_round_trip() {
    let mut tree = BTree::new(4).unwrap();
    for (k, v) in [(1, "one"), (2, "two"), (3, "three"), (4, "four"), (5, "five")] {
        tree.insert(k, v.to_string());
    }
    for (k, v) in [(1, "one"), (2, "two"), (3, "three"), (4, "four"), (5, "five")] {
        let path = tree.search(k).unwrap();
        assert!(path.ends_with(&format!("\"{v}\"]")));
    }
}

#[test]
fn delete_absent_key_on_nonempty_tree_is_key_not_found() {
    let mut tree = BTree::new(4).unwrap();
    tree.insert(1, "a".to_string());
    assert_eq!(tree.delete(2), Err(BTreeError::KeyNotFound));
}

#[test]
fn large_sequential_insert_stays_searchable() {
    let mut tree = BTree::new(5).unwrap();
    for k in 0..200i64 {
        tree.insert(k, format!("v{k}"));
    }
    for k in 0..200i64 {
        let path = tree.search(k).unwrap();
        assert!(path.ends_with(&format!("\"v{k}\"]")));
    }
}

#[test]
fn delete_everything_leaves_an_empty_tree() {
    let mut tree = BTree::new(4).unwrap();
    let keys: Vec<i64> = (0..50).collect();
    for &k in &keys {
        tree.insert(k, format!("v{k}"));
    }
    for &k in &keys {
        tree.delete(k).unwrap();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.dump(), "{}");
}

#[test]
fn order_is_echoed_back() {
    let tree = BTree::new(7).unwrap();
    assert_eq!(tree.order(), 7);
}
