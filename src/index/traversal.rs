use crate::index::node::TrieNode;
use crate::types::identifiers::{CacheKey, Token};

/// Iterator over the marked boundaries of a [`PrefixIndex`](super::PrefixIndex).
///
/// Depth-first with an explicit stack; each stack frame remembers how long the
/// shared path buffer was when the frame was pushed, so the buffer is rewound
/// instead of cloned per node. Call `entries()` again to restart.
pub struct Entries<'a> {
    stack: Vec<(&'a TrieNode, usize)>,
    path: Vec<Token>,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(root: &'a TrieNode) -> Self {
        Self {
            stack: vec![(root, 0)],
            path: Vec::new(),
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (Vec<Token>, CacheKey);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, depth)) = self.stack.pop() {
            self.path.truncate(depth);
            self.path.extend_from_slice(&node.edge);

            let here = self.path.len();
            // reversed so the smallest first token is visited first
            for child in node.children.values().rev() {
                self.stack.push((child, here));
            }

            if let Some(key) = node.key {
                return Some((self.path.clone(), key));
            }
        }
        None
    }
}
