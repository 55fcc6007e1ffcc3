//! Forward-only cursor over a [`BPlusTree`]'s leaf chain (§4.1 "Leaf chain").
//!
//! `range`/`full_scan` on the tree itself already materialize their results
//! into a `Vec`; `Cursor` exists for callers that want to walk the chain
//! lazily without paying for a full materialization up front.

use super::node::NodeId;
use super::BPlusTree;

pub struct Cursor<'a, V> {
    tree: &'a BPlusTree<V>,
    leaf: Option<NodeId>,
    index: usize,
}

impl<'a, V: Clone> Cursor<'a, V> {
    pub(super) fn new(tree: &'a BPlusTree<V>) -> Self {
        Cursor {
            tree,
            leaf: Some(tree.leftmost_leaf()),
            index: 0,
        }
    }

    /// Repositions the cursor at the first key `>= key`.
    pub fn seek(&mut self, key: &str) {
        let leaf_id = self.tree.find_leaf(key);
        let (keys, _, _) = self.tree.node(leaf_id).as_leaf();
        let index = keys.partition_point(|k| k.as_str() < key);
        if index < keys.len() {
            self.leaf = Some(leaf_id);
            self.index = index;
        } else {
            self.advance_to_next_leaf(leaf_id);
        }
    }

    fn advance_to_next_leaf(&mut self, from: NodeId) {
        let (_, _, next) = self.tree.node(from).as_leaf();
        self.leaf = *next;
        self.index = 0;
    }
}

impl<'a, V: Clone> Iterator for Cursor<'a, V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf_id = self.leaf?;
            let (keys, values, next) = self.tree.node(leaf_id).as_leaf();
            if self.index < keys.len() {
                let item = (keys[self.index].clone(), values[self.index].clone());
                self.index += 1;
                return Some(item);
            }
            self.leaf = *next;
            self.index = 0;
            if self.leaf.is_none() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::BPlusTree;

    #[test]
    fn cursor_walks_leaf_chain_in_order() {
        let mut tree = BPlusTree::new(4).unwrap();
        for i in 0..50 {
            tree.insert(&format!("k{i:03}"), i).unwrap();
        }
        let collected: Vec<_> = tree.cursor().collect();
        assert_eq!(collected.len(), 50);
        for w in collected.windows(2) {
            assert!(w[0].0 < w[1].0);
        }
    }

    #[test]
    fn cursor_seek_positions_at_first_key_not_less_than() {
        let mut tree = BPlusTree::new(4).unwrap();
        for i in 0..20 {
            tree.insert(&format!("k{i:03}"), i).unwrap();
        }
        let mut cursor = tree.cursor();
        cursor.seek("k010");
        assert_eq!(cursor.next().unwrap().0, "k010");
    }
}
