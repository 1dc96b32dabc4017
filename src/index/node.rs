use std::collections::BTreeMap;

use crate::types::identifiers::{CacheKey, Token};

/// A node of the radix trie.
///
/// `edge` is the token run leading into this node from its parent; it is
/// empty only for the root. Children are keyed by the first token of their
/// edge, so no two children can start with the same token.
#[derive(Debug, Default)]
pub struct TrieNode {
    pub(crate) edge: Vec<Token>,
    pub(crate) children: BTreeMap<Token, TrieNode>,
    pub(crate) key: Option<CacheKey>,
}

impl TrieNode {
    pub(crate) fn leaf(edge: Vec<Token>, key: CacheKey) -> Self {
        Self {
            edge,
            children: BTreeMap::new(),
            key: Some(key),
        }
    }

    pub fn edge(&self) -> &[Token] {
        &self.edge
    }

    pub fn key(&self) -> Option<CacheKey> {
        self.key
    }

    pub fn children(&self) -> impl Iterator<Item = &TrieNode> {
        self.children.values()
    }

    /// Split this node's edge at `at`.
    /// The node keeps `edge[..at]`; its marker and children move to a new
    /// single child holding `edge[at..]`.
    pub(crate) fn split_at(&mut self, at: usize) {
        debug_assert!(at > 0 && at < self.edge.len());

        let suffix = self.edge.split_off(at);
        let Some(&first) = suffix.first() else {
            return;
        };
        let lower = TrieNode {
            edge: suffix,
            children: std::mem::take(&mut self.children),
            key: self.key.take(),
        };
        self.children.insert(first, lower);
    }

    /// Fold an unmarked node into its only child by concatenating edges.
    /// No-op unless the node is unmarked with exactly one child.
    pub(crate) fn merge_only_child(&mut self) {
        if self.key.is_some() || self.children.len() != 1 {
            return;
        }
        if let Some((_, child)) = std::mem::take(&mut self.children).into_iter().next() {
            self.edge.extend(child.edge);
            self.children = child.children;
            self.key = child.key;
        }
    }
}

/// Length of the longest common prefix of two token runs.
pub fn common_prefix_len(a: &[Token], b: &[Token]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
