use std::collections::HashMap;
use std::path::Path;

use crate::error::{DatasetError, Result, VocabularyKind};

/// Ordered token vocabulary with per-token frequencies
///
/// A token's index is its position in first-encounter order. The hash index
/// mirrors `tokens` so lookups are O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    kind: VocabularyKind,
    tokens: Vec<String>,
    frequencies: Vec<u64>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new(kind: VocabularyKind) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
            frequencies: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rebuild a vocabulary from its persisted token and frequency lists
    pub fn from_parts(
        kind: VocabularyKind,
        tokens: Vec<String>,
        frequencies: Vec<u64>,
    ) -> Result<Self> {
        if tokens.len() != frequencies.len() {
            return Err(DatasetError::invalid_vocabulary(format!(
                "{} vocabulary has {} tokens but {} frequencies",
                kind,
                tokens.len(),
                frequencies.len()
            )));
        }

        let mut index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), i).is_some() {
                return Err(DatasetError::invalid_vocabulary(format!(
                    "{} vocabulary lists {:?} twice",
                    kind, token
                )));
            }
        }

        Ok(Self {
            kind,
            tokens,
            frequencies,
            index,
        })
    }

    /// Count one occurrence of a token, appending it if unseen
    pub fn observe(&mut self, token: &str) {
        self.observe_n(token, 1);
    }

    /// Count `count` occurrences of a token; a zero count never adds a token
    pub fn observe_n(&mut self, token: &str, count: u64) {
        if count == 0 {
            return;
        }
        match self.index.get(token) {
            Some(&i) => self.frequencies[i] += count,
            None => {
                self.index.insert(token.to_string(), self.tokens.len());
                self.tokens.push(token.to_string());
                self.frequencies.push(count);
            }
        }
    }

    pub fn kind(&self) -> VocabularyKind {
        self.kind
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn frequencies(&self) -> &[u64] {
        &self.frequencies
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get_index(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn get_token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn frequency(&self, token: &str) -> Option<u64> {
        self.get_index(token).map(|i| self.frequencies[i])
    }

    /// Map the tokens of one record to indices
    ///
    /// The first unknown token is an `OutOfVocabularyToken` error naming `record`.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S], record: &Path) -> Result<Vec<usize>> {
        tokens
            .iter()
            .map(|t| {
                let token = t.as_ref();
                self.get_index(token)
                    .ok_or_else(|| DatasetError::OutOfVocabularyToken {
                        record: record.to_path_buf(),
                        token: token.to_string(),
                        kind: self.kind,
                    })
            })
            .collect()
    }

    /// Map indices back to tokens; `None` if any index is out of range
    pub fn decode(&self, indices: &[usize]) -> Option<Vec<&str>> {
        indices.iter().map(|&i| self.get_token(i)).collect()
    }
}

/// The word and character vocabularies of a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabularies {
    pub words: Vocabulary,
    pub characters: Vocabulary,
}

impl Vocabularies {
    pub fn new() -> Self {
        Self {
            words: Vocabulary::new(VocabularyKind::Words),
            characters: Vocabulary::new(VocabularyKind::Characters),
        }
    }
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self::new()
    }
}
