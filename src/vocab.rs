#![allow(dead_code)]
//! Frozen ground-truth vocabulary and binary term vectors.
//!
//! Pure functions, no async. The vocabulary is fitted once on ground truth
//! and then only read: every text (ground truth and predictions alike) is
//! vectorized against the same instance so columns line up.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{BenchError, Result};

/// Word runs of two or more characters.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static token pattern"))
}

/// Lowercase `text`, then split it into word tokens.
///
/// `\w` here is Unicode-aware and also matches combining marks (category M),
/// so a base letter plus a combining accent counts as two word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sorted, deduplicated term list with a term → column lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build the vocabulary from ground-truth documents.
    pub fn fit<I, S>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = BTreeSet::new();
        for doc in documents {
            terms.extend(tokenize(doc.as_ref()));
        }

        if terms.is_empty() {
            return Err(BenchError::EmptyVocabulary);
        }

        let terms: Vec<String> = terms.into_iter().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Ok(Self { terms, index })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn position(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Presence vector of `text` over this vocabulary. Unknown tokens are ignored.
    pub fn vectorize(&self, text: &str) -> TermVector {
        let mut bits = vec![false; self.terms.len()];
        for token in tokenize(text) {
            if let Some(i) = self.position(&token) {
                bits[i] = true;
            }
        }
        TermVector { bits }
    }

    pub fn vectorize_all<I, S>(&self, texts: I) -> Vec<TermVector>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .map(|t| self.vectorize(t.as_ref()))
            .collect()
    }
}

/// Fixed-length binary presence vector, one entry per vocabulary term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermVector {
    bits: Vec<bool>,
}

impl TermVector {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn count_present(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}
