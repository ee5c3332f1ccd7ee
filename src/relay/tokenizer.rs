//! Subword tokenizer shared by prompt budgeting and truncation.
//!
//! The same vocabulary must back both token counting and window slicing;
//! mixing two tokenizers would break the budget guarantee.

use tiktoken_rs::{CoreBPE, p50k_base};

use crate::relay::errors::{RelayError, RelayResult};

/// BPE tokenizer over the GPT-3 completion-model vocabulary.
pub struct Tokenizer {
    bpe: CoreBPE,
}

impl Tokenizer {
    /// Load the `p50k_base` vocabulary.
    ///
    /// # Errors
    /// Returns an error if the vocabulary cannot be loaded.
    pub fn new() -> RelayResult<Self> {
        let bpe = p50k_base().map_err(|err| RelayError::Tokenization(err.to_string()))?;
        Ok(Self { bpe })
    }

    /// Encode text into BPE token ids.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    /// Number of tokens in `text`.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    /// Decode token ids back into text.
    ///
    /// # Errors
    /// Returns an error if the ids do not decode to valid UTF-8.
    pub fn decode(&self, tokens: &[u32]) -> RelayResult<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|err| RelayError::Tokenization(err.to_string()))
    }

    /// Decode the longest decodable suffix of `tokens`.
    ///
    /// Slicing a BPE sequence at an arbitrary boundary can land inside a
    /// multi-byte character; the window start advances until the suffix
    /// decodes. Lossy by contract, never an error.
    #[must_use]
    pub fn decode_suffix_lossy(&self, tokens: &[u32]) -> String {
        for start in 0..tokens.len() {
            if let Ok(text) = self.decode(&tokens[start..]) {
                return text;
            }
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_zero_tokens() {
        let tokenizer = Tokenizer::new().unwrap();
        assert_eq!(tokenizer.count(""), 0);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = "User: Hi\nAssistant: Hello!";
        let tokens = tokenizer.encode(text);
        assert!(!tokens.is_empty());
        assert_eq!(tokenizer.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_count_matches_encode_len() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(tokenizer.count(text), tokenizer.encode(text).len());
    }

    #[test]
    fn test_suffix_decode_is_text_suffix() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = "héllo wörld, this is a tokenizer boundary check";
        let tokens = tokenizer.encode(text);
        for start in 0..tokens.len() {
            let suffix = tokenizer.decode_suffix_lossy(&tokens[start..]);
            assert!(text.ends_with(&suffix), "not a suffix: {suffix:?}");
        }
    }
}
