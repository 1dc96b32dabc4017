use sha2::{Digest, Sha256};

use crate::types::identifiers::Token;

pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn count_tokens(&self, text: &str) -> usize {
        self.tokenize(text).len()
    }
}

/// Demo tokenizer: one token per whitespace-separated word.
///
/// Token id = first 4 bytes of SHA-256(word), big-endian, modulo
/// `vocab_size`. Stable across runs, unlike std's randomized hasher.
/// Real deployments plug in the model's own tokenizer.
#[derive(Debug, Clone, Copy)]
pub struct WhitespaceTokenizer {
    vocab_size: u32,
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        Self { vocab_size: 100_000 }
    }
}

impl WhitespaceTokenizer {
    pub fn with_vocab_size(vocab_size: u32) -> Self {
        Self {
            vocab_size: vocab_size.max(1),
        }
    }

    fn word_id(&self, word: &str) -> Token {
        let digest = Sha256::digest(word.as_bytes());
        let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        head % self.vocab_size
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace().map(|w| self.word_id(w)).collect()
    }

    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
