use std::collections::btree_map::Entry;

use tracing::trace;

use crate::index::node::{common_prefix_len, TrieNode};
use crate::index::traversal::Entries;
use crate::types::identifiers::{CacheKey, Token};

/// Radix trie over token sequences.
///
/// Stores only cache keys at boundary nodes, never payloads. All operations
/// are O(L) in the length of the sequence, independent of how many sequences
/// are stored. PrefixIndex is single-owner and non-reentrant.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    root: TrieNode,
    len: usize,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of marked boundaries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    pub fn clear(&mut self) {
        dismantle(std::mem::take(&mut self.root));
        self.len = 0;
    }

    /// Mark `tokens` as a cached boundary carrying `key`.
    ///
    /// Returns the key previously stored at exactly this boundary, if any
    /// (last write wins). Inserting an empty sequence is a no-op.
    pub fn insert(&mut self, tokens: &[Token], key: CacheKey) -> Option<CacheKey> {
        if tokens.is_empty() {
            return None;
        }

        let mut node = &mut self.root;
        let mut rest = tokens;

        loop {
            let Some(&first) = rest.first() else {
                let previous = node.key.replace(key);
                if previous.is_none() {
                    self.len += 1;
                }
                return previous;
            };

            let child = match node.children.entry(first) {
                Entry::Vacant(slot) => {
                    slot.insert(TrieNode::leaf(rest.to_vec(), key));
                    self.len += 1;
                    return None;
                }
                Entry::Occupied(slot) => slot.into_mut(),
            };

            let common = common_prefix_len(&child.edge, rest);
            if common < child.edge.len() {
                trace!(at = common, edge_len = child.edge.len(), "splitting edge");
                child.split_at(common);
            }

            rest = &rest[common..];
            node = child;
        }
    }

    /// Deepest marked boundary that is a prefix of `tokens`.
    ///
    /// Returns `(matched_length, key)`, or `None` when no marked boundary is
    /// reachable. Traversal continues past marked nodes while the query still
    /// matches, so the longest boundary wins.
    pub fn find_longest_prefix(&self, tokens: &[Token]) -> Option<(usize, CacheKey)> {
        let mut node = &self.root;
        let mut pos = 0;
        let mut best = node.key.map(|key| (0, key));

        while let Some(first) = tokens.get(pos) {
            let Some(child) = node.children.get(first) else {
                break;
            };

            let rest = &tokens[pos..];
            if common_prefix_len(&child.edge, rest) < child.edge.len() {
                // query ends or diverges inside the edge
                break;
            }

            pos += child.edge.len();
            node = child;

            if let Some(key) = node.key {
                best = Some((pos, key));
            }
        }

        best
    }

    /// Longest prefix of `tokens` present anywhere in the trie, boundary or
    /// not, paired with a boundary at or below the point where matching
    /// stopped. Any such boundary's state covers the matched prefix.
    ///
    /// Prefers the boundary the match ends on; otherwise takes the first
    /// boundary below it in token order.
    pub fn find_longest_covered(&self, tokens: &[Token]) -> Option<(usize, CacheKey)> {
        let mut node = &self.root;
        let mut pos = 0;

        while let Some(first) = tokens.get(pos) {
            let Some(child) = node.children.get(first) else {
                break;
            };

            let common = common_prefix_len(&child.edge, &tokens[pos..]);
            if common < child.edge.len() {
                return first_boundary(child).map(|key| (pos + common, key));
            }

            pos += common;
            node = child;
        }

        if pos == 0 {
            return None;
        }
        first_boundary(node).map(|key| (pos, key))
    }

    /// Key stored at exactly this boundary, if any.
    pub fn get(&self, tokens: &[Token]) -> Option<CacheKey> {
        self.locate(tokens)
            .and_then(|path| self.node_at(&path))
            .and_then(|node| node.key)
    }

    /// Sequence whose boundary holds `key`. Linear in the number of boundaries.
    pub fn path_of(&self, key: CacheKey) -> Option<Vec<Token>> {
        self.entries().find(|(_, k)| *k == key).map(|(path, _)| path)
    }

    /// Clear the boundary at exactly `tokens`, then prune and re-compress.
    ///
    /// Returns the removed key. Sequences that were never inserted, or that
    /// end at an unmarked interior point, are left alone.
    pub fn remove(&mut self, tokens: &[Token]) -> Option<CacheKey> {
        let path = self.locate(tokens)?;
        let (&last, parent_path) = path.split_last()?;
        let parent_is_root = parent_path.is_empty();

        let parent = node_at_mut(&mut self.root, parent_path)?;
        let target = parent.children.get_mut(&last)?;
        let removed = target.key.take()?;

        match target.children.len() {
            0 => {
                parent.children.remove(&last);
            }
            1 => target.merge_only_child(),
            _ => {}
        }

        // Losing a child can leave the parent as an unmarked pass-through.
        if !parent_is_root {
            parent.merge_only_child();
        }

        self.len -= 1;
        Some(removed)
    }

    /// Lazily yields every `(sequence, key)` boundary in ascending token order.
    /// Uses an explicit stack, so deep chains cannot overflow the call stack.
    pub fn entries(&self) -> Entries<'_> {
        Entries::new(&self.root)
    }

    /// Total nodes, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.values());
        }
        count
    }

    /// Checks the radix invariants on every node: non-root edges are
    /// non-empty, children are keyed by their first edge token, and no
    /// non-root node is unmarked with fewer than two children.
    pub fn is_compressed(&self) -> bool {
        let mut stack: Vec<&TrieNode> = self.root.children.values().collect();
        if !self.root.edge.is_empty() {
            return false;
        }

        while let Some(node) = stack.pop() {
            if node.edge.is_empty() {
                return false;
            }
            if node.key.is_none() && node.children.len() < 2 {
                return false;
            }
            for (first, child) in &node.children {
                if child.edge.first() != Some(first) {
                    return false;
                }
                stack.push(child);
            }
        }
        true
    }

    /// First tokens of each edge on the exact path to `tokens`, if the path
    /// ends on a node boundary.
    fn locate(&self, tokens: &[Token]) -> Option<Vec<Token>> {
        if tokens.is_empty() {
            return None;
        }

        let mut path = Vec::new();
        let mut node = &self.root;
        let mut rest = tokens;

        while let Some(&first) = rest.first() {
            let child = node.children.get(&first)?;
            if !rest.starts_with(&child.edge) {
                return None;
            }
            path.push(first);
            rest = &rest[child.edge.len()..];
            node = child;
        }

        Some(path)
    }

    fn node_at(&self, path: &[Token]) -> Option<&TrieNode> {
        let mut node = &self.root;
        for first in path {
            node = node.children.get(first)?;
        }
        Some(node)
    }
}

impl Drop for PrefixIndex {
    fn drop(&mut self) {
        dismantle(std::mem::take(&mut self.root));
    }
}

/// Shallowest marker on the leftmost path down from `node`. Leaves are always
/// marked, so this only fails on an empty root.
fn first_boundary(node: &TrieNode) -> Option<CacheKey> {
    let mut node = node;
    loop {
        if let Some(key) = node.key {
            return Some(key);
        }
        node = node.children.values().next()?;
    }
}

/// Drop a subtree one node at a time; the derived drop would recurse once
/// per level.
fn dismantle(root: TrieNode) {
    let mut stack = vec![root];
    while let Some(mut node) = stack.pop() {
        stack.extend(std::mem::take(&mut node.children).into_values());
    }
}

fn node_at_mut<'a>(root: &'a mut TrieNode, path: &[Token]) -> Option<&'a mut TrieNode> {
    let mut node = root;
    for first in path {
        node = node.children.get_mut(first)?;
    }
    Some(node)
}
