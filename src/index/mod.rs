pub mod node;
pub mod traversal;
pub mod trie;

pub use node::{common_prefix_len, TrieNode};
pub use traversal::Entries;
pub use trie::PrefixIndex;
